use anyhow::{Result, Context, anyhow};
use log::{warn, info, debug};
use std::fs;
use std::path::{Path, PathBuf};
use indicatif::{ProgressBar, ProgressStyle};

use crate::app_config::Config;
use crate::ass_usage::UsageExtractor;
use crate::embed_codec::{self, EmbeddedFont};
use crate::errors::FontError;
use crate::file_utils::FileManager;
use crate::font_index::{FontNameIndex, read_font_records};
use crate::font_matcher;
use crate::subset_orchestrator::{self, SubsetRequest, SubsetResult};

// @module: Application controller for font analysis and subsetting runs

/// Options for a subset run, mirroring the CLI surface
#[derive(Debug, Clone)]
pub struct SubsetOptions {
    /// Input subtitle file
    pub ass_file: PathBuf,

    /// Directory containing candidate font files
    pub fonts_dir: PathBuf,

    /// Output directory for standalone subset files (default: next to input)
    pub output_dir: Option<PathBuf>,

    /// Embed the subsets into the subtitle instead of writing font files
    pub embed: bool,

    /// Output subtitle path when embedding (default: `<stem>.embedded.ass`)
    pub output_ass: Option<PathBuf>,

    /// Match and report without writing anything
    pub dry_run: bool,
}

/// Main application controller for font subsetting
pub struct Controller {
    // @field: App configuration
    config: Config,
}

impl Controller {
    /// Create a new controller for test purposes with default configuration
    pub fn new_for_test() -> Result<Self> {
        Self::with_config(Config::default())
    }

    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Check if the controller is properly initialized with configuration
    pub fn is_initialized(&self) -> bool {
        !self.config.default_font_name.is_empty()
    }

    /// Analyze a subtitle file and report its font usage
    pub fn run_analyze(&self, ass_file: &Path) -> Result<()> {
        let content = FileManager::read_to_string(ass_file)?;
        let requirement = UsageExtractor::new(&self.config.default_font_name)
            .extract(&content)
            .context("Failed to parse subtitle file")?;

        info!("Analyzing: {:?}", ass_file);

        if requirement.is_empty() {
            info!("No font usage found in the file");
        }

        for (font_name, chars) in &requirement.usages {
            let sample: String = chars.iter().take(50).collect();
            let suffix = if chars.len() > 50 { "..." } else { "" };
            info!("Font: {}", font_name);
            info!("  Characters used: {}", chars.len());
            if !chars.is_empty() {
                info!("  Sample: {}{}", sample, suffix);
            }
        }

        // Fonts someone already embedded are worth knowing about too
        match embed_codec::parse_embedded_fonts(&content) {
            Ok(embedded) if !embedded.is_empty() => {
                info!("Embedded fonts already present: {}", embedded.len());
                for font in &embedded {
                    info!("  {} ({} bytes)", font.filename, font.data.len());
                }
            }
            Ok(_) => {}
            Err(e) => warn!("Existing [Fonts] section is corrupt: {}", e),
        }

        Ok(())
    }

    /// Show name-table information for a font file
    pub fn run_info(&self, font_file: &Path) -> Result<()> {
        let data = fs::read(font_file)
            .with_context(|| format!("Failed to read font file: {:?}", font_file))?;
        let records =
            read_font_records(font_file, &data).map_err(|e| anyhow!(e.to_string()))?;

        info!("{:?}", font_file);
        for record in &records {
            if records.len() > 1 {
                info!("Face {}:", record.face_index);
            }
            for (kind, name) in &record.names {
                info!("  {}: {}", kind.label(), name);
            }
            info!("  glyphs: {}", record.glyph_count);
        }

        Ok(())
    }

    /// Run the full subset workflow: extract usage, scan fonts, match,
    /// subset, and write either standalone font files or an embedded
    /// subtitle. Per-font problems are collected and summarized; only
    /// conditions that sink the entire run return an error.
    pub async fn run_subset(&self, options: SubsetOptions) -> Result<()> {
        let content = FileManager::read_to_string(&options.ass_file)?;
        let requirement = UsageExtractor::new(&self.config.default_font_name)
            .extract(&content)
            .context("Failed to parse subtitle file")?;

        if requirement.is_empty() {
            return Err(anyhow!("No fonts found in the ASS file"));
        }

        info!("Scanning fonts in: {:?}", options.fonts_dir);
        let index =
            FontNameIndex::scan_directory(&options.fonts_dir, &self.config.font_extensions)?;
        if index.is_empty() {
            return Err(anyhow!(
                "No readable font files found in {:?}",
                options.fonts_dir
            ));
        }
        info!(
            "Found {} font face(s), {} name mapping(s)",
            index.face_count(),
            index.name_count()
        );

        // Resolve every required font against the index
        let mut unmatched: Vec<String> = Vec::new();
        let mut requests: Vec<SubsetRequest> = Vec::new();

        for (font_name, chars) in &requirement.usages {
            let result = font_matcher::match_font(font_name, &index);
            match result.resolved {
                Some(resolved) => {
                    if chars.is_empty() {
                        debug!("Skipping '{}', no characters used", font_name);
                        continue;
                    }
                    info!(
                        "{} -> {:?} (matched by {})",
                        font_name,
                        resolved.record.path,
                        resolved.matched_kind.label()
                    );
                    requests.push(SubsetRequest {
                        font_name: font_name.clone(),
                        record: resolved.record,
                        chars: chars.clone(),
                    });
                }
                None => unmatched.push(font_name.clone()),
            }
        }

        if options.dry_run {
            for request in &requests {
                info!(
                    "Would subset '{}' from {:?}: {} glyphs, {} characters needed",
                    request.font_name,
                    request.record.path,
                    request.record.glyph_count,
                    request.chars.len()
                );
                if options.embed {
                    info!("  Would embed into the subtitle file");
                } else {
                    let name =
                        FileManager::subset_file_name(&request.font_name, &request.record.path);
                    info!("  Would create: {}", name);
                }
            }
            self.report_summary(&unmatched, &index, &[]);
            if requests.is_empty() {
                return Err(anyhow!("No fonts would be processed"));
            }
            return Ok(());
        }

        let progress = ProgressBar::new(requests.len() as u64);
        progress.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} fonts {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );

        let progress_clone = progress.clone();
        let outcomes = subset_orchestrator::subset_all(
            requests,
            self.config.concurrent_subsets,
            move |done, _total| progress_clone.set_position(done as u64),
        )
        .await;
        progress.finish_and_clear();

        let mut successes: Vec<SubsetResult> = Vec::new();
        let mut failures: Vec<(String, FontError)> = Vec::new();
        for (font_name, outcome) in outcomes {
            match outcome {
                Ok(result) => {
                    let reduction =
                        100.0 * (1.0 - result.subset_size as f64 / result.original_size as f64);
                    info!(
                        "{}: {} -> {} glyphs, {} -> {} bytes ({:.1}% smaller)",
                        result.font_name,
                        result.original_glyphs,
                        result.subset_glyphs,
                        result.original_size,
                        result.subset_size,
                        reduction
                    );
                    successes.push(result);
                }
                Err(e) => failures.push((font_name, e)),
            }
        }

        if successes.is_empty() {
            self.report_summary(&unmatched, &index, &failures);
            return Err(anyhow!("No fonts were processed"));
        }

        if options.embed {
            let fonts: Vec<EmbeddedFont> = successes
                .iter()
                .map(|result| EmbeddedFont {
                    filename: FileManager::subset_file_name(
                        &result.font_name,
                        &result.source_path,
                    ),
                    data: result.data.clone(),
                })
                .collect();

            let output_path = options
                .output_ass
                .clone()
                .unwrap_or_else(|| FileManager::embedded_output_path(&options.ass_file));
            let embedded = embed_codec::embed_fonts(&content, &fonts);
            FileManager::write_to_file(&output_path, &embedded)?;
            info!(
                "Embedded {} font(s) into {:?} ({} bytes)",
                fonts.len(),
                output_path,
                embedded.len()
            );
        } else {
            let output_dir = options.output_dir.clone().unwrap_or_else(|| {
                options
                    .ass_file
                    .parent()
                    .map(|p| p.to_path_buf())
                    .unwrap_or_else(|| PathBuf::from("."))
            });
            FileManager::ensure_dir(&output_dir)?;

            for result in &successes {
                let file_name =
                    FileManager::subset_file_name(&result.font_name, &result.source_path);
                let output_path = output_dir.join(file_name);
                FileManager::write_bytes(&output_path, &result.data)?;
                info!("Wrote {:?}", output_path);
            }
        }

        self.report_summary(&unmatched, &index, &failures);
        info!("Done, processed {} font(s)", successes.len());

        Ok(())
    }

    /// End-of-run summary enumerating every font that needs manual
    /// attention, by name, so the user can supply or rename files
    fn report_summary(
        &self,
        unmatched: &[String],
        index: &FontNameIndex,
        failures: &[(String, FontError)],
    ) {
        for font_name in unmatched {
            warn!("Unmatched font: '{}' (no file provides this name)", font_name);
        }
        for (path, reason) in &index.skipped {
            warn!("Unreadable font file {:?}: {}", path, reason);
        }
        for (font_name, error) in failures {
            warn!("Subsetting failed for '{}': {}", font_name, error);
        }
    }
}
