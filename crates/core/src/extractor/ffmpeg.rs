//! FFmpeg-based extractor implementation.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::process::Command;
use tracing::{debug, warn};

use crate::config::ExtractorConfig;
use crate::metrics::EXTRACTOR_OPERATIONS;

use super::error::ExtractorError;
use super::traits::MetadataExtractor;
use super::types::FormatInfo;

/// Extractor that shells out to `ffmpeg` and `ffprobe`.
pub struct FfmpegExtractor {
    config: ExtractorConfig,
}

impl FfmpegExtractor {
    /// Creates a new FFmpeg extractor with the given configuration.
    pub fn new(config: ExtractorConfig) -> Self {
        Self { config }
    }

    /// Creates an extractor with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(ExtractorConfig::default())
    }

    /// Builds ffmpeg arguments for a single-frame grab.
    ///
    /// `-ss` before `-i` seeks on the input, so remote sources are not
    /// decoded from the start.
    fn build_thumbnail_args(&self, source: &str, offset: Duration, output: &Path) -> Vec<String> {
        vec![
            "-y".to_string(),
            "-ss".to_string(),
            format!("{:.3}", offset.as_secs_f64()),
            "-i".to_string(),
            source.to_string(),
            "-frames:v".to_string(),
            "1".to_string(),
            "-q:v".to_string(),
            "2".to_string(),
            "-loglevel".to_string(),
            self.config.ffmpeg_log_level.clone(),
            output.to_string_lossy().to_string(),
        ]
    }

    /// Builds ffprobe arguments for a format-level probe.
    fn build_probe_args(source: &str) -> Vec<String> {
        vec![
            "-v".to_string(),
            "quiet".to_string(),
            "-print_format".to_string(),
            "json".to_string(),
            "-show_format".to_string(),
            source.to_string(),
        ]
    }

    /// Parses ffprobe JSON output into FormatInfo.
    fn parse_probe_output(output: &str) -> Result<FormatInfo, ExtractorError> {
        #[derive(Deserialize)]
        struct ProbeOutput {
            format: ProbeFormat,
        }

        #[derive(Deserialize)]
        struct ProbeFormat {
            format_name: Option<String>,
            duration: Option<String>,
            size: Option<String>,
            tags: Option<Map<String, Value>>,
        }

        let probe: ProbeOutput =
            serde_json::from_str(output).map_err(|e| ExtractorError::Parse {
                reason: format!("Failed to parse ffprobe output: {}", e),
            })?;

        Ok(FormatInfo {
            duration: probe
                .format
                .duration
                .as_deref()
                .and_then(|d| d.parse::<f64>().ok()),
            size: probe
                .format
                .size
                .as_deref()
                .and_then(|s| s.parse::<u64>().ok()),
            tags: probe.format.tags,
            format_name: probe.format.format_name,
        })
    }

    /// Removes a partially written output so failed grabs leave nothing behind.
    async fn discard_output(output_path: &Path) {
        if let Err(e) = tokio::fs::remove_file(output_path).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!(path = %output_path.display(), error = %e, "Failed to remove partial thumbnail");
            }
        }
    }

    fn spawn_error(&self, e: std::io::Error, binary: &Path, probe: bool) -> ExtractorError {
        if e.kind() == std::io::ErrorKind::NotFound {
            if probe {
                ExtractorError::FfprobeNotFound {
                    path: binary.to_path_buf(),
                }
            } else {
                ExtractorError::FfmpegNotFound {
                    path: binary.to_path_buf(),
                }
            }
        } else {
            ExtractorError::Io(e)
        }
    }
}

#[async_trait]
impl MetadataExtractor for FfmpegExtractor {
    fn name(&self) -> &str {
        "ffmpeg"
    }

    async fn extract_thumbnail(
        &self,
        source_url: &str,
        offset: Duration,
        output_path: &Path,
    ) -> Result<PathBuf, ExtractorError> {
        let start = Instant::now();
        let offset_ms = offset.as_millis() as u64;

        if let Some(parent) = output_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let args = self.build_thumbnail_args(source_url, offset, output_path);
        debug!(source = %source_url, offset_ms, "Extracting thumbnail");

        let output = Command::new(&self.config.ffmpeg_path)
            .args(&args)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| self.spawn_error(e, &self.config.ffmpeg_path, false))?;

        if !output.status.success() {
            Self::discard_output(output_path).await;
            EXTRACTOR_OPERATIONS
                .with_label_values(&["thumbnail", "error"])
                .inc();
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(ExtractorError::frame_extraction(
                offset_ms,
                format!("FFmpeg exited with code: {:?}", output.status.code()),
                if stderr.is_empty() { None } else { Some(stderr) },
            ));
        }

        // Seeking past the end exits cleanly but encodes nothing.
        let written = tokio::fs::metadata(output_path)
            .await
            .map(|m| m.len())
            .unwrap_or(0);
        if written == 0 {
            Self::discard_output(output_path).await;
            EXTRACTOR_OPERATIONS
                .with_label_values(&["thumbnail", "error"])
                .inc();
            return Err(ExtractorError::frame_extraction(
                offset_ms,
                "no frame at offset (source shorter than offset?)",
                None,
            ));
        }

        EXTRACTOR_OPERATIONS
            .with_label_values(&["thumbnail", "success"])
            .inc();
        debug!(
            path = %output_path.display(),
            size_bytes = written,
            duration_ms = start.elapsed().as_millis() as u64,
            "Thumbnail written"
        );

        Ok(output_path.to_path_buf())
    }

    async fn probe_format(&self, source_url: &str) -> Result<FormatInfo, ExtractorError> {
        let output = Command::new(&self.config.ffprobe_path)
            .args(Self::build_probe_args(source_url))
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| self.spawn_error(e, &self.config.ffprobe_path, true))?;

        if !output.status.success() {
            EXTRACTOR_OPERATIONS.with_label_values(&["probe", "error"]).inc();
            return Err(ExtractorError::probe(format!(
                "ffprobe exited with code {:?}: {}",
                output.status.code(),
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let info = Self::parse_probe_output(&stdout).inspect_err(|_| {
            EXTRACTOR_OPERATIONS.with_label_values(&["probe", "error"]).inc();
        })?;

        EXTRACTOR_OPERATIONS
            .with_label_values(&["probe", "success"])
            .inc();
        Ok(info)
    }

    async fn validate(&self) -> Result<(), ExtractorError> {
        Command::new(&self.config.ffmpeg_path)
            .arg("-version")
            .output()
            .await
            .map_err(|e| self.spawn_error(e, &self.config.ffmpeg_path, false))?;

        Command::new(&self.config.ffprobe_path)
            .arg("-version")
            .output()
            .await
            .map_err(|e| self.spawn_error(e, &self.config.ffprobe_path, true))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::THUMBNAIL_OFFSET;

    fn missing_tools() -> FfmpegExtractor {
        FfmpegExtractor::new(ExtractorConfig {
            ffmpeg_path: PathBuf::from("/nonexistent/ffmpeg"),
            ffprobe_path: PathBuf::from("/nonexistent/ffprobe"),
            ..Default::default()
        })
    }

    /// Extractor whose ffmpeg is a shell script running `body`. The output
    /// path (last argument) is available as `$out`.
    #[cfg(unix)]
    fn scripted_ffmpeg(dir: &Path, body: &str) -> FfmpegExtractor {
        use std::os::unix::fs::PermissionsExt;

        let script = dir.join("ffmpeg");
        std::fs::write(&script, format!("#!/bin/sh\nfor out; do :; done\n{}\n", body)).unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();
        FfmpegExtractor::new(ExtractorConfig {
            ffmpeg_path: script,
            ..Default::default()
        })
    }

    #[test]
    fn test_build_thumbnail_args() {
        let extractor = FfmpegExtractor::with_defaults();
        let args = extractor.build_thumbnail_args(
            "https://cdn.example.com/demo/clip.mp4",
            THUMBNAIL_OFFSET,
            Path::new("public/thumbnail-1.jpg"),
        );

        let ss = args.iter().position(|a| a == "-ss").unwrap();
        let input = args.iter().position(|a| a == "-i").unwrap();
        assert!(ss < input, "seek must precede the input");
        assert_eq!(args[ss + 1], "3.500");
        assert_eq!(args[input + 1], "https://cdn.example.com/demo/clip.mp4");
        assert!(args.windows(2).any(|w| w == ["-frames:v", "1"]));
        assert_eq!(args.last().unwrap(), "public/thumbnail-1.jpg");
    }

    #[test]
    fn test_build_probe_args_format_only() {
        let args = FfmpegExtractor::build_probe_args("https://x/clip.mp4");
        assert!(args.contains(&"-show_format".to_string()));
        assert!(!args.contains(&"-show_streams".to_string()));
        assert_eq!(args.last().unwrap(), "https://x/clip.mp4");
    }

    #[test]
    fn test_parse_probe_output() {
        let json = r#"{
            "format": {
                "filename": "https://cdn.example.com/demo/clip.mp4",
                "nb_streams": 2,
                "format_name": "mov,mp4,m4a,3gp,3g2,mj2",
                "format_long_name": "QuickTime / MOV",
                "start_time": "0.000000",
                "duration": "12.345000",
                "size": "10485760",
                "bit_rate": "6795000",
                "tags": {
                    "major_brand": "isom",
                    "encoder": "Lavf60.3.100"
                }
            }
        }"#;

        let info = FfmpegExtractor::parse_probe_output(json).unwrap();
        assert_eq!(info.format_name.as_deref(), Some("mov,mp4,m4a,3gp,3g2,mj2"));
        assert!((info.duration.unwrap() - 12.345).abs() < 1e-9);
        assert_eq!(info.size, Some(10_485_760));
        let tags = info.tags.unwrap();
        assert_eq!(tags["encoder"], "Lavf60.3.100");
    }

    #[test]
    fn test_parse_probe_output_unreported_fields() {
        let json = r#"{ "format": { "format_name": "hls", "duration": "N/A" } }"#;
        let info = FfmpegExtractor::parse_probe_output(json).unwrap();
        assert_eq!(info.format_name.as_deref(), Some("hls"));
        assert!(info.duration.is_none());
        assert!(info.size.is_none());
        assert!(info.tags.is_none());
    }

    #[test]
    fn test_parse_probe_output_malformed() {
        let result = FfmpegExtractor::parse_probe_output("{}");
        assert!(matches!(result, Err(ExtractorError::Parse { .. })));

        let result = FfmpegExtractor::parse_probe_output("not json");
        assert!(matches!(result, Err(ExtractorError::Parse { .. })));
    }

    #[tokio::test]
    async fn test_missing_ffmpeg_reported() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("thumb.jpg");
        let result = missing_tools()
            .extract_thumbnail("https://x/clip.mp4", THUMBNAIL_OFFSET, &output)
            .await;
        assert!(matches!(result, Err(ExtractorError::FfmpegNotFound { .. })));
        assert!(!output.exists());
    }

    #[tokio::test]
    async fn test_missing_ffprobe_reported() {
        let result = missing_tools().probe_format("https://x/clip.mp4").await;
        assert!(matches!(result, Err(ExtractorError::FfprobeNotFound { .. })));
    }

    #[tokio::test]
    async fn test_validate_missing_tools() {
        let result = missing_tools().validate().await;
        assert!(matches!(result, Err(ExtractorError::FfmpegNotFound { .. })));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_clean_exit_without_frame_is_frame_extraction_error() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("public").join("thumb.jpg");
        let extractor = scripted_ffmpeg(dir.path(), "exit 0");

        let result = extractor
            .extract_thumbnail("https://x/short.mp4", THUMBNAIL_OFFSET, &output)
            .await;

        match result {
            Err(ExtractorError::FrameExtraction {
                offset_ms, stderr, ..
            }) => {
                assert_eq!(offset_ms, 3500);
                assert!(stderr.is_none());
            }
            other => panic!("expected FrameExtraction, got {:?}", other),
        }
        assert!(!output.exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_empty_output_file_is_discarded() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("thumb.jpg");
        let extractor = scripted_ffmpeg(dir.path(), ": > \"$out\"\nexit 0");

        let result = extractor
            .extract_thumbnail("https://x/short.mp4", THUMBNAIL_OFFSET, &output)
            .await;

        assert!(matches!(result, Err(ExtractorError::FrameExtraction { .. })));
        assert!(!output.exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_nonzero_exit_reports_stderr_and_removes_partial_output() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("thumb.jpg");
        let extractor = scripted_ffmpeg(
            dir.path(),
            "printf partial > \"$out\"\necho 'Server returned 404 Not Found' >&2\nexit 1",
        );

        let result = extractor
            .extract_thumbnail("https://x/missing.mp4", THUMBNAIL_OFFSET, &output)
            .await;

        match result {
            Err(ExtractorError::FrameExtraction {
                offset_ms,
                reason,
                stderr,
            }) => {
                assert_eq!(offset_ms, 3500);
                assert!(reason.contains("Some(1)"), "reason: {}", reason);
                assert_eq!(stderr.as_deref(), Some("Server returned 404 Not Found"));
            }
            other => panic!("expected FrameExtraction, got {:?}", other),
        }
        assert!(!output.exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_written_frame_is_returned() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("thumb.jpg");
        let extractor = scripted_ffmpeg(dir.path(), "printf 'JFIF' > \"$out\"\nexit 0");

        let path = extractor
            .extract_thumbnail("https://x/clip.mp4", THUMBNAIL_OFFSET, &output)
            .await
            .unwrap();

        assert_eq!(path, output);
        assert_eq!(std::fs::read(&output).unwrap(), b"JFIF");
    }
}
