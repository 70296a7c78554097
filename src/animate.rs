//! # Animation Module
//!
//! Merges the saved PNG frames of a batch into one animated GIF by shelling out
//! to an image conversion tool (ImageMagick's `convert` by default).
//!
//! The GIF is named after the common prefix of the frame file names, so
//! `dem_001.asc.png`, `dem_002.asc.png` produce `dem_00.gif`. When the names
//! share no prefix the output is `animation.gif`.

use crate::error::AnimateError;
use log::{debug, info};
use std::path::{Path, PathBuf};
use std::process::Command;

/// Output name used when the frames share no common prefix.
pub const DEFAULT_GIF_NAME: &str = "animation.gif";

/// Default inter-frame delay, in hundredths of a second.
pub const DEFAULT_DELAY: u32 = 20;

/// Something that can merge image frames into an animation.
pub trait FrameMerger {
    fn merge(&self, frames: &[PathBuf], output: &Path, delay: u32) -> Result<(), AnimateError>;
}

/// Merges frames with an ImageMagick-compatible command line:
/// `<tool> -delay <delay> -loop 0 <frames...> <output>`.
#[derive(Debug, Clone)]
pub struct ImageMagickMerger {
    tool: String,
}

impl ImageMagickMerger {
    pub fn new(tool: impl Into<String>) -> Self {
        Self { tool: tool.into() }
    }

    /// Program and arguments that [`FrameMerger::merge`] runs.
    pub fn command_line(&self, frames: &[PathBuf], output: &Path, delay: u32) -> Vec<String> {
        let mut argv: Vec<String> = self.tool.split_whitespace().map(str::to_string).collect();
        argv.push("-delay".to_string());
        argv.push(delay.to_string());
        argv.push("-loop".to_string());
        argv.push("0".to_string());
        argv.extend(frames.iter().map(|f| f.to_string_lossy().into_owned()));
        argv.push(output.to_string_lossy().into_owned());
        argv
    }
}

impl Default for ImageMagickMerger {
    fn default() -> Self {
        Self::new("convert")
    }
}

impl FrameMerger for ImageMagickMerger {
    fn merge(&self, frames: &[PathBuf], output: &Path, delay: u32) -> Result<(), AnimateError> {
        let argv = self.command_line(frames, output, delay);
        let Some((program, args)) = argv.split_first() else {
            return Err(AnimateError::Spawn {
                tool: self.tool.clone(),
                source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "empty command"),
            });
        };

        debug!("Running: {}", argv.join(" "));
        let output = Command::new(program)
            .args(args)
            .output()
            .map_err(|source| AnimateError::Spawn {
                tool: self.tool.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(AnimateError::ToolFailed {
                tool: self.tool.clone(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(())
    }
}

/// Splits a command string into program and arguments.
pub(crate) fn split_command(command: &str) -> Option<(&str, Vec<&str>)> {
    let mut parts = command.split_whitespace();
    let program = parts.next()?;
    Some((program, parts.collect()))
}

/// Name of the GIF for a set of frames, from their common file-name prefix.
pub fn gif_output_name(frames: &[PathBuf]) -> String {
    let names: Vec<String> = frames
        .iter()
        .filter_map(|f| f.file_name())
        .map(|n| n.to_string_lossy().into_owned())
        .collect();

    let prefix = common_prefix(&names);
    let prefix = prefix
        .trim_end_matches(|c: char| c == '.' || c == '_' || c == '-' || c.is_whitespace());
    if prefix.is_empty() {
        DEFAULT_GIF_NAME.to_string()
    } else {
        format!("{}.gif", prefix)
    }
}

fn common_prefix(names: &[String]) -> &str {
    let Some(first) = names.first() else {
        return "";
    };
    let mut end = first.len();
    for name in &names[1..] {
        end = first
            .char_indices()
            .zip(name.chars())
            .take_while(|((_, a), b)| a == b)
            .last()
            .map(|((i, c), _)| i + c.len_utf8())
            .unwrap_or(0)
            .min(end);
    }
    &first[..end]
}

/// Merges the saved frames of a batch into a GIF in `out_dir`.
///
/// `frames` holds one entry per input file, in input order; `None` marks a
/// file that was not saved. Returns the GIF path, or `None` when there was
/// nothing to merge.
pub fn assemble(
    frames: &[Option<PathBuf>],
    out_dir: &Path,
    delay: u32,
    merger: &dyn FrameMerger,
) -> Result<Option<PathBuf>, AnimateError> {
    let saved: Vec<PathBuf> = frames.iter().flatten().cloned().collect();
    if saved.is_empty() {
        return Ok(None);
    }

    let output = out_dir.join(gif_output_name(&saved));
    info!("Creating animation from {} frames: {}", saved.len(), output.display());
    merger.merge(&saved, &output, delay)?;
    Ok(Some(output))
}
