use anyhow::{anyhow, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use log::{info, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use crate::app_config::Config;
use crate::correction::{ProgressCallback, Sleeper, SubtitleCorrector};
use crate::file_utils::FileManager;
use crate::homophone::{render_report, HomophoneDictionary};
use crate::language_utils::get_language_name;
use crate::providers::{self, Provider};
use crate::subtitle_processor::SubtitleTrack;
use crate::timing;

// @module: Application controller for file-level workflows

/// Files written by a correction run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorrectionFiles {
    /// Corrected subtitle file
    pub subtitles: PathBuf,
    /// Plain-text change report
    pub report: PathBuf,
    /// True when existing outputs were kept and nothing ran
    pub skipped: bool,
}

/// Files written by a homophone replacement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HomophoneFiles {
    /// Text with replacements applied
    pub text: PathBuf,
    /// Markdown replacement report
    pub report: PathBuf,
}

/// Main application controller
pub struct Controller {
    // @field: App configuration
    config: Config,
    // @field: Provider override, built from config when absent
    provider: Option<Arc<dyn Provider>>,
    // @field: Delay source override for the correction engine
    sleeper: Option<Arc<dyn Sleeper>>,
}

impl Controller {
    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        Ok(Self {
            config,
            provider: None,
            sleeper: None,
        })
    }

    /// Use `provider` instead of the configured one
    pub fn with_provider(mut self, provider: Arc<dyn Provider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Use `sleeper` for pacing and retry delays
    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = Some(sleeper);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn provider(&self) -> Result<Arc<dyn Provider>> {
        match &self.provider {
            Some(provider) => Ok(Arc::clone(provider)),
            None => providers::from_config(&self.config.providers, self.config.correction.temperature)
                .context("Failed to create provider"),
        }
    }

    /// Correct `subtitle_file` against `transcript_file`.
    ///
    /// Writes `<stem>.corrected.srt` and `<stem>.corrections.txt` next to the
    /// subtitle file, or into `output_dir`. Nothing is written when the run
    /// fails.
    pub async fn correct_file(
        &self,
        transcript_file: &Path,
        subtitle_file: &Path,
        output_dir: Option<&Path>,
        force_overwrite: bool,
    ) -> Result<CorrectionFiles> {
        let start_time = Instant::now();
        let output_dir = output_dir.map_or_else(|| FileManager::parent_dir(subtitle_file), Path::to_path_buf);
        let subtitles_path = FileManager::generate_output_path(subtitle_file, &output_dir, "corrected", "srt");
        let report_path = FileManager::generate_output_path(subtitle_file, &output_dir, "corrections", "txt");

        if FileManager::file_exists(&subtitles_path) && !force_overwrite {
            warn!("Skipping file, corrected subtitles already exist (use -f to force overwrite)");
            return Ok(CorrectionFiles {
                subtitles: subtitles_path,
                report: report_path,
                skipped: true,
            });
        }

        let transcript = FileManager::read_to_string(transcript_file)?;
        let subtitles = FileManager::read_to_string(subtitle_file)?;

        let provider = self.provider()?;
        info!(
            "Correcting {} with {} ({})",
            subtitle_file.display(),
            provider.name(),
            self.config.providers.model()
        );

        let progress_bar = Self::batch_progress_bar();
        let mut corrector = SubtitleCorrector::new(provider, self.config.correction.to_options())
            .with_progress_callback(Self::progress_callback(&progress_bar));
        if let Some(sleeper) = &self.sleeper {
            corrector = corrector.with_sleeper(Arc::clone(sleeper));
        }

        let outcome = corrector
            .correct_subtitles(&transcript, &subtitles, self.config.correction.batch_size)
            .await;
        progress_bar.finish_and_clear();
        let outcome = outcome.with_context(|| format!("Failed to correct {}", subtitle_file.display()))?;

        FileManager::ensure_dir(&output_dir)?;
        outcome.track.write_to_file(&subtitles_path)?;
        FileManager::write_to_file(&report_path, &outcome.report.render())?;

        info!(
            "Correction completed in {}: {} ({} change note(s))",
            Self::format_duration(start_time.elapsed()),
            subtitles_path.display(),
            outcome.report.lines().len()
        );

        Ok(CorrectionFiles {
            subtitles: subtitles_path,
            report: report_path,
            skipped: false,
        })
    }

    fn batch_progress_bar() -> ProgressBar {
        let progress_bar = ProgressBar::new(0);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} batches ({percent}%) {msg}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress_bar.set_style(style.progress_chars("█▓▒░"));
        progress_bar.set_message("Correcting");
        progress_bar
    }

    fn progress_callback(progress_bar: &ProgressBar) -> ProgressCallback {
        let progress_bar = progress_bar.clone();
        Arc::new(move |done: usize, total: usize| {
            progress_bar.set_length(total as u64);
            progress_bar.set_position(done as u64);
        })
    }

    /// Rescale `subtitle_file` to `duration_secs` and write `<stem>.rescaled.srt`
    /// (or `output`)
    pub fn rescale_file(&self, subtitle_file: &Path, duration_secs: f64, output: Option<&Path>) -> Result<PathBuf> {
        let content = FileManager::read_to_string(subtitle_file)?;
        let output_path = output.map_or_else(
            || FileManager::generate_output_path(subtitle_file, FileManager::parent_dir(subtitle_file), "rescaled", "srt"),
            Path::to_path_buf,
        );

        FileManager::write_to_file(&output_path, &timing::rescale_srt(&content, duration_secs))?;
        info!("Rescaled subtitles to {:.3}s: {}", duration_secs, output_path.display());
        Ok(output_path)
    }

    /// Merge segment subtitle files into `output`.
    ///
    /// Directories in `inputs` are searched for `.srt` files. All files are
    /// ordered by their numeric name prefix. Returns the merged entry count.
    pub fn merge_files(&self, inputs: &[PathBuf], output: &Path) -> Result<usize> {
        let mut files = Vec::new();
        for input in inputs {
            if FileManager::dir_exists(input) {
                files.extend(FileManager::find_files(input, "srt")?);
            } else if FileManager::file_exists(input) {
                files.push(input.clone());
            } else {
                return Err(anyhow!("Input path does not exist: {:?}", input));
            }
        }
        files.retain(|path| path.as_path() != output);
        FileManager::sort_by_numeric_prefix(&mut files);

        if files.is_empty() {
            return Err(anyhow!("No subtitle files to merge"));
        }

        let segments = files
            .iter()
            .map(SubtitleTrack::read_from_file)
            .collect::<Result<Vec<_>>>()?;
        for (file, segment) in files.iter().zip(&segments) {
            if segment.is_empty() {
                warn!("No subtitle entries in {}, skipping", file.display());
            }
        }

        let language_name = get_language_name(&self.config.language)
            .unwrap_or_else(|_| self.config.language.clone());
        info!("Merging {} segment file(s) as {}", files.len(), language_name);

        let merged = timing::merge_tracks(&segments, &self.config.language);
        merged.write_to_file(output)?;
        info!("Merged {} file(s) into {} ({} entries)", files.len(), output.display(), merged.len());
        Ok(merged.len())
    }

    /// Apply the homophone dictionary to a text file
    pub fn replace_homophones_file(&self, text_file: &Path, output: Option<&Path>) -> Result<HomophoneFiles> {
        let dictionary = match &self.config.homophone_dictionary {
            Some(path) => HomophoneDictionary::from_file(path)?,
            None => HomophoneDictionary::built_in(),
        };

        let text = FileManager::read_to_string(text_file)?;
        let (replaced, records) = dictionary.replace(&text);

        let text_path = output.map_or_else(
            || FileManager::generate_output_path(text_file, FileManager::parent_dir(text_file), "replaced", "txt"),
            Path::to_path_buf,
        );
        let report_path = FileManager::generate_output_path(&text_path, FileManager::parent_dir(&text_path), "homophones", "md");

        FileManager::write_to_file(&text_path, &replaced)?;
        FileManager::write_to_file(&report_path, &render_report(&records))?;
        info!("Applied {} homophone replacement(s): {}", records.len(), text_path.display());

        Ok(HomophoneFiles {
            text: text_path,
            report: report_path,
        })
    }

    /// Test the configured provider connection
    pub async fn check_provider(&self) -> Result<()> {
        let provider = self.provider()?;
        provider
            .test_connection()
            .await
            .with_context(|| format!("Connection test failed for {}", provider.name()))?;
        info!("{} connection OK ({})", provider.name(), self.config.providers.model());
        Ok(())
    }

    // Format duration in a human-readable format (HH:MM:SS)
    fn format_duration(duration: std::time::Duration) -> String {
        let total_seconds = duration.as_secs();
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}.{:03}s", seconds, duration.subsec_millis())
        }
    }
}
