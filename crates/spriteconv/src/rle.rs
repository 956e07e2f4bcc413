//! Windowed, size-bounded run-length coding over arbitrary symbol sequences.
//!
//! The codec knows nothing about colors or images: it turns a slice of
//! equality-comparable symbols into a list of [`Packet`]s whose concatenated
//! expansion reproduces the input exactly, and back again.

use crate::{Result, SpriteError};

/// One unit of run-length coded output.
///
/// Every packet covers at least one symbol; a zero-length packet is a logic
/// error and is never constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Packet<T> {
    /// `count` consecutive occurrences of a single symbol.
    Run { value: T, count: usize },
    /// A verbatim stretch of symbols that did not compress.
    Literal(Vec<T>),
}

impl<T> Packet<T> {
    /// Number of symbols this packet expands to.
    pub fn len(&self) -> usize {
        match self {
            Packet::Run { count, .. } => *count,
            Packet::Literal(symbols) => symbols.len(),
        }
    }

    /// Always false for packets produced by [`RleCodec::encode`].
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Stateless run-length encoder/decoder.
///
/// The type exists so callers that treat compression as an optional
/// collaborator can inject (or withhold) it; all operations are pure
/// functions of their inputs.
#[derive(Debug, Clone, Copy, Default)]
pub struct RleCodec;

impl RleCodec {
    /// Encodes `input` in a single pass.
    ///
    /// A run becomes a [`Packet::Run`] only when its length *strictly
    /// exceeds* `min_run`; shorter runs join the surrounding literal.
    /// Packets are sliced to `max_packet` symbols: literals into consecutive
    /// full-size chunks with a shorter tail, runs into full-size runs plus a
    /// remainder. `max_packet == 0` means unbounded.
    pub fn encode<T: Clone + PartialEq>(
        &self,
        input: &[T],
        min_run: usize,
        max_packet: usize,
    ) -> Result<Vec<Packet<T>>> {
        if min_run == 0 {
            return Err(SpriteError::InvalidArgument("min_run must be at least 1"));
        }
        let max_packet = if max_packet == 0 {
            usize::MAX
        } else {
            max_packet
        };

        let mut packets = Vec::new();
        let mut literal: Vec<T> = Vec::new();

        let mut i = 0;
        while i < input.len() {
            let value = &input[i];
            let mut run = 1;
            while i + run < input.len() && input[i + run] == *value {
                run += 1;
            }

            if run > min_run {
                flush_literal(&mut literal, max_packet, &mut packets);
                push_run(value.clone(), run, max_packet, &mut packets);
            } else {
                literal.extend_from_slice(&input[i..i + run]);
            }
            i += run;
        }
        flush_literal(&mut literal, max_packet, &mut packets);

        Ok(packets)
    }

    /// Encodes `input` as consecutive fixed-size windows.
    ///
    /// Each window is compressed independently, so a run never spans a
    /// window boundary (the last window may be shorter). `window == 0` or a
    /// window covering the whole input degrades to [`RleCodec::encode`].
    pub fn encode_windowed<T: Clone + PartialEq>(
        &self,
        input: &[T],
        window: usize,
        min_run: usize,
        max_packet: usize,
    ) -> Result<Vec<Packet<T>>> {
        if window == 0 || window >= input.len() {
            return self.encode(input, min_run, max_packet);
        }

        let mut packets = Vec::new();
        for segment in input.chunks(window) {
            packets.extend(self.encode(segment, min_run, max_packet)?);
        }
        Ok(packets)
    }

    /// Expands `packets` back into the flat symbol sequence.
    ///
    /// Total for any packet list; `decode(encode(x, ..)) == x` for every
    /// finite input.
    pub fn decode<T: Clone>(&self, packets: &[Packet<T>]) -> Vec<T> {
        let total = packets.iter().map(Packet::len).sum();
        let mut output = Vec::with_capacity(total);
        for packet in packets {
            match packet {
                Packet::Run { value, count } => {
                    output.extend(std::iter::repeat_n(value.clone(), *count));
                }
                Packet::Literal(symbols) => output.extend_from_slice(symbols),
            }
        }
        output
    }
}

fn flush_literal<T: Clone>(literal: &mut Vec<T>, max_packet: usize, packets: &mut Vec<Packet<T>>) {
    if literal.is_empty() {
        return;
    }
    for chunk in literal.chunks(max_packet) {
        packets.push(Packet::Literal(chunk.to_vec()));
    }
    literal.clear();
}

fn push_run<T: Clone>(value: T, mut count: usize, max_packet: usize, packets: &mut Vec<Packet<T>>) {
    while count > max_packet {
        packets.push(Packet::Run {
            value: value.clone(),
            count: max_packet,
        });
        count -= max_packet;
    }
    if count > 0 {
        packets.push(Packet::Run { value, count });
    }
}
