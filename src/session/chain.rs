//! Read chains
//!
//! A reply is a fixed sequence of frames, e.g. a command reply is
//! `(string, string, byte)`. A chain issues those reads one after another,
//! each from inside the previous one's continuation, and hands the collected
//! frames to a terminal handler once the last one arrives.
//!
//! ```text
//!  read(String) ──► read(String) ──► read(Byte) ──► on_complete(a, b, c)
//! ```
//!
//! Reads never overlap: step N+1 is only issued once step N has produced its
//! frame, whether that happens synchronously (data already buffered) or on a
//! later data arrival.

use std::collections::VecDeque;

use crate::error::{Result, WireError};
use crate::protocol::{Frame, ReadKind};

use super::pending::FrameSource;

/// Receives every collected frame, in step order
pub type Terminal<S> = Box<dyn FnOnce(&mut S, Vec<Frame>) -> Result<()> + Send>;

/// A value assembled from a fixed sequence of frames
pub trait FromFrames: Sized + Send + 'static {
    /// The reads that produce this value, in order
    const SHAPE: &'static [ReadKind];

    fn from_frames(frames: Vec<Frame>) -> Result<Self>;
}

impl FromFrames for String {
    const SHAPE: &'static [ReadKind] = &[ReadKind::String];

    fn from_frames(frames: Vec<Frame>) -> Result<Self> {
        let [text] = exact::<1>(frames)?;
        text.into_text()
    }
}

impl FromFrames for u8 {
    const SHAPE: &'static [ReadKind] = &[ReadKind::Byte];

    fn from_frames(frames: Vec<Frame>) -> Result<Self> {
        let [byte] = exact::<1>(frames)?;
        byte.into_byte()
    }
}

/// Command reply: result, info, status
impl FromFrames for (String, String, u8) {
    const SHAPE: &'static [ReadKind] = &[ReadKind::String, ReadKind::String, ReadKind::Byte];

    fn from_frames(frames: Vec<Frame>) -> Result<Self> {
        let [result, info, status] = exact::<3>(frames)?;
        Ok((result.into_text()?, info.into_text()?, status.into_byte()?))
    }
}

/// Run the reads described by `R::SHAPE` and pass the typed value on
pub fn run<S, R, F>(source: &mut S, on_complete: F) -> Result<()>
where
    S: FrameSource,
    R: FromFrames,
    F: FnOnce(&mut S, R) -> Result<()> + Send + 'static,
{
    run_steps(
        source,
        R::SHAPE.to_vec(),
        Box::new(move |source: &mut S, frames| on_complete(source, R::from_frames(frames)?)),
    )
}

/// Run an explicit list of reads and pass the raw frames on
pub fn run_steps<S: FrameSource>(source: &mut S, steps: Vec<ReadKind>, on_complete: Terminal<S>) -> Result<()> {
    let collected = Vec::with_capacity(steps.len());
    advance(source, steps.into(), collected, on_complete)
}

fn advance<S: FrameSource>(
    source: &mut S,
    mut steps: VecDeque<ReadKind>,
    mut collected: Vec<Frame>,
    on_complete: Terminal<S>,
) -> Result<()> {
    match steps.pop_front() {
        None => on_complete(source, collected),
        Some(kind) => source.read(
            kind,
            Box::new(move |source: &mut S, frame| {
                collected.push(frame);
                advance(source, steps, collected, on_complete)
            }),
        ),
    }
}

fn exact<const N: usize>(frames: Vec<Frame>) -> Result<[Frame; N]> {
    let got = frames.len();
    <[Frame; N]>::try_from(frames)
        .map_err(|_| WireError::Protocol(format!("expected {} frames, got {}", N, got)))
}
