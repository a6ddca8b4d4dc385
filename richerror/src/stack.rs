//! Call stack capture.
//!
//! Capture walks the current thread's stack with the `backtrace` crate,
//! skips the frames that belong to the capture itself, and keeps at most
//! [`MAX_STACK_DEPTH`] frames. Deeper stacks are truncated without error.

use backtrace::Frame;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Upper bound on the number of frames kept per capture.
pub const MAX_STACK_DEPTH: usize = 10;

/// `capture` itself and the `RichError::with_stack` call wrapping it.
const INTERNAL_FRAMES: usize = 2;

/// Frames inspected while looking for the capture boundary.
const SCAN_LIMIT: usize = 32;

const CAPTURE_SYMBOL: &str = "richerror::stack::capture";

/// A single captured frame. Depth 0 is the immediate caller of the
/// capturing constructor or mutator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackFrame {
    pub depth: usize,
    pub instruction_pointer: usize,
    pub file: String,
    pub function: String,
    pub line: u32,
}

impl StackFrame {
    /// Function name without its module path.
    #[must_use]
    pub fn short_function(&self) -> &str {
        short_function_name(&self.function)
    }
}

impl fmt::Display for StackFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "L:{} {:#x} - {}:{} - {}",
            self.depth, self.instruction_pointer, self.file, self.line, self.function
        )
    }
}

pub(crate) fn short_function_name(name: &str) -> &str {
    name.rsplit("::").next().unwrap_or(name)
}

struct RawFrame {
    ip: usize,
    symbol_address: usize,
    file: Option<String>,
    function: Option<String>,
    line: Option<u32>,
}

/// Captures up to [`MAX_STACK_DEPTH`] frames, starting `stack_offset` frames
/// above the caller of `RichError::with_stack`.
#[inline(never)]
pub(crate) fn capture(stack_offset: usize) -> Vec<StackFrame> {
    let limit = SCAN_LIMIT + stack_offset + MAX_STACK_DEPTH;
    let mut raw = Vec::with_capacity(limit);
    backtrace::trace(|frame| {
        raw.push(resolve(frame));
        raw.len() < limit
    });

    let start = first_caller_index(&raw) + stack_offset;
    raw.into_iter()
        .skip(start)
        .take(MAX_STACK_DEPTH)
        .enumerate()
        .map(|(depth, frame)| StackFrame {
            depth,
            instruction_pointer: frame.ip,
            file: frame.file.unwrap_or_default(),
            function: frame.function.unwrap_or_default(),
            line: frame.line.unwrap_or_default(),
        })
        .collect()
}

fn resolve(frame: &Frame) -> RawFrame {
    let mut raw = RawFrame {
        ip: frame.ip() as usize,
        symbol_address: frame.symbol_address() as usize,
        file: None,
        function: None,
        line: None,
    };
    // Inlined frames report several symbols; the first is the innermost.
    backtrace::resolve_frame(frame, |symbol| {
        if raw.function.is_none() {
            raw.function = symbol.name().map(|name| format!("{name:#}"));
            raw.file = symbol.filename().map(|path| path.display().to_string());
            raw.line = symbol.lineno();
        }
    });
    raw
}

/// Index of the first frame outside the capture machinery.
///
/// The unwinder contributes a varying number of frames of its own, so the
/// `capture` frame is located by address (or by symbol name) and the fixed
/// internal skip is applied from there. Without either the fixed skip is
/// applied from the innermost frame.
fn first_caller_index(frames: &[RawFrame]) -> usize {
    let capture_fn: fn(usize) -> Vec<StackFrame> = capture;
    let capture_address = capture_fn as usize;
    frames
        .iter()
        .position(|frame| {
            frame.symbol_address == capture_address
                || frame
                    .function
                    .as_deref()
                    .is_some_and(|name| name.starts_with(CAPTURE_SYMBOL))
        })
        .map_or(INTERNAL_FRAMES, |index| index + INTERNAL_FRAMES)
}
