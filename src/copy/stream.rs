//! Stream content copying.
//!
//! This module copies bytes between two open channels until the source is
//! exhausted, handling partial writes and retrying interrupted calls.

use crate::callback::{Callback, Notifier, Progress, Status, retry_if_interrupted};
use crate::error::{Error, ErrorCode, Result};
use crate::options::CopyOptions;
use std::io::{self, Read, Write};

/// Copy everything readable from `input` onto `output`.
///
/// `offset` is an optional running offset owned by the caller. Its value is
/// used as the starting offset for progress reporting, and on return (success
/// or failure) it holds the starting value plus every byte actually written.
/// This supports progress reporting across resumed copies. The offset does not
/// seek either channel.
///
/// `expected_size` is passed through to the callback; use 0 when unknown.
///
/// Neither channel is closed or flushed. On error, the position of both
/// channels is unspecified.
///
/// # Callback protocol
///
/// - [`Status::Running`] at the start and after every
///   [`callback_interval`](CopyOptions::callback_interval) reads; aborting
///   returns [`ErrorCode::Aborted`].
/// - [`Status::Failed`] with [`ErrorCode::Read`] or [`ErrorCode::Write`] on
///   each failing call; aborting returns that error, anything else retries.
///   The default action retries interrupted calls only.
/// - [`Status::Eof`] once the source is exhausted; aborting returns
///   [`ErrorCode::Aborted`] even though every byte was copied.
///
/// Without a callback, interrupted calls are retried and any other error
/// fails immediately.
///
/// # Example
///
/// ```
/// use copyfile::{copy_stream, CopyOptions};
///
/// let mut input: &[u8] = b"hello world";
/// let mut output = Vec::new();
/// let mut offset = 0;
///
/// copy_stream(&mut input, &mut output, Some(&mut offset), 0, &CopyOptions::default(), None)?;
/// assert_eq!(output, b"hello world");
/// assert_eq!(offset, 11);
/// # Ok::<(), copyfile::Error>(())
/// ```
pub fn copy_stream<R, W>(
    input: &mut R,
    output: &mut W,
    offset: Option<&mut u64>,
    expected_size: u64,
    options: &CopyOptions,
    callback: Option<&mut dyn Callback>,
) -> Result<()>
where
    R: Read + ?Sized,
    W: Write + ?Sized,
{
    let mut local_offset = 0;
    let offset = offset.unwrap_or(&mut local_offset);
    let mut notifier = Notifier::new(callback);
    copy_loop(input, output, offset, expected_size, options, &mut notifier)
}

fn copy_loop<R, W>(
    input: &mut R,
    output: &mut W,
    offset: &mut u64,
    expected_size: u64,
    options: &CopyOptions,
    notifier: &mut Notifier<'_>,
) -> Result<()>
where
    R: Read + ?Sized,
    W: Write + ?Sized,
{
    let data = |offset: u64| Progress::Data {
        offset,
        size: expected_size,
    };

    if notifier.progress(Status::Running, data(*offset)) {
        return Err(Error::aborted());
    }

    let mut buf = vec![0u8; options.buffer_size.max(1)];
    let interval = options.callback_interval.max(1);
    let mut reads: u32 = 0;

    loop {
        let read = match input.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) => {
                let default_action = retry_if_interrupted(&e);
                if notifier.should_retry(ErrorCode::Read, &e, data(*offset), default_action) {
                    continue;
                }
                return Err(Error::os(ErrorCode::Read, e));
            }
        };

        let mut pending = &buf[..read];
        while !pending.is_empty() {
            let result = match output.write(pending) {
                Ok(0) => Err(io::Error::new(
                    io::ErrorKind::WriteZero,
                    "destination accepted no data",
                )),
                other => other,
            };
            match result {
                Ok(written) => {
                    pending = &pending[written..];
                    *offset += written as u64;
                }
                Err(e) => {
                    let default_action = retry_if_interrupted(&e);
                    if notifier.should_retry(ErrorCode::Write, &e, data(*offset), default_action) {
                        continue;
                    }
                    return Err(Error::os(ErrorCode::Write, e));
                }
            }
        }

        reads += 1;
        if reads >= interval {
            reads = 0;
            if notifier.progress(Status::Running, data(*offset)) {
                return Err(Error::aborted());
            }
        }
    }

    if notifier.progress(Status::Eof, data(*offset)) {
        return Err(Error::aborted());
    }
    Ok(())
}

// =============================================================================
// Tests
// =============================================================================
