//! File-pipeline entry point behind the `parallel-to-m2` binary.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::Parser;
use tracing::{info, warn};

use crate::align::{AlignConfig, MergeStrategy};
use crate::batch::{CHUNK_SIZE, Workers};
use crate::error::M2Error;
use crate::file::{FileError, create_output, open_lines};
use crate::json::RunReport;
use crate::m2::{M2Writer, write_record};
use crate::pipeline::SentencePairProcessor;
use crate::resources::{ResourcePaths, Resources};

/// Long flags that may also be spelled with a single dash
const LEGACY_FLAGS: &[&str] = &["orig", "cor", "out", "lev", "merge"];

/// Convert parallel original and corrected text files (one tokenized
/// sentence per line) into M2 format
#[derive(Parser, Debug)]
#[command(name = "parallel-to-m2")]
#[command(version)]
#[command(about = "Convert parallel original and corrected sentences into M2 annotations", long_about = None)]
pub struct Args {
    /// The path to the original text file
    #[arg(long)]
    pub orig: PathBuf,

    /// The path to the corrected text file
    #[arg(long)]
    pub cor: PathBuf,

    /// The output filepath
    #[arg(long)]
    pub out: PathBuf,

    /// Use standard Levenshtein to align sentences
    #[arg(long)]
    pub lev: bool,

    /// Merging strategy for automatic alignment
    #[arg(long, value_enum, default_value_t = MergeStrategy::Rules)]
    pub merge: MergeStrategy,

    /// Word list used to detect spelling errors
    #[arg(long, value_name = "PATH")]
    pub dict: Option<PathBuf>,

    /// PTB tag to coarse class map
    #[arg(long = "tag-map", value_name = "PATH")]
    pub tag_map: Option<PathBuf>,

    /// Fail when the input files have different line counts
    #[arg(long)]
    pub strict: bool,

    /// Worker threads for annotating sentence pairs
    #[arg(short, long, default_value_t = 1)]
    pub jobs: usize,

    /// Print the run report as JSON
    #[arg(long)]
    pub json: bool,
}

/// Rewrite `-orig`-style flags to their `--orig` spelling
pub fn normalize_legacy_args<I>(args: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    args.into_iter()
        .map(|arg| match arg.strip_prefix('-') {
            Some(name) if !name.starts_with('-') && LEGACY_FLAGS.contains(&name) => format!("-{}", arg),
            _ => arg,
        })
        .collect()
}

/// Settings for one file-pipeline run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    pub orig: PathBuf,
    pub cor: PathBuf,
    pub out: PathBuf,
    pub align: AlignConfig,
    pub resources: ResourcePaths,
    pub strict: bool,
    pub jobs: usize,
}

impl From<Args> for RunConfig {
    fn from(args: Args) -> Self {
        Self {
            orig: args.orig,
            cor: args.cor,
            out: args.out,
            align: AlignConfig {
                use_levenshtein: args.lev,
                merge: args.merge,
            },
            resources: ResourcePaths::with_overrides(args.dict, args.tag_map),
            strict: args.strict,
            jobs: args.jobs,
        }
    }
}

/// Load resources, then annotate the input files
pub fn run_files(config: &RunConfig) -> Result<RunReport, M2Error> {
    info!("Loading resources...");
    let resources = Resources::load(&config.resources)?;
    run_files_with(config, Arc::new(resources))
}

/// Annotate the input files with already loaded resources
///
/// Sentence blocks are written as soon as they are ready; with more than
/// one job, pairs are read and annotated in chunks.
pub fn run_files_with(config: &RunConfig, resources: Arc<Resources>) -> Result<RunReport, M2Error> {
    if config.strict {
        let originals = count_lines(&config.orig)?;
        let references = count_lines(&config.cor)?;
        if originals != references {
            return Err(M2Error::InputLengthMismatch { originals, references });
        }
    }

    info!("Processing files...");
    let mut originals = open_lines(&config.orig)?;
    let mut references = open_lines(&config.cor)?;
    let mut writer = M2Writer::new(create_output(&config.out)?);

    let processor = SentencePairProcessor::new(resources, config.align);
    let workers = Workers::new(config.jobs)?;
    let chunk_size = if workers.is_parallel() { CHUNK_SIZE } else { 1 };

    let mut report = RunReport::new(config.out.display().to_string(), config.align);
    let mut leftover = (0, 0);
    let mut exhausted = false;

    while !exhausted {
        let mut chunk_orig = Vec::with_capacity(chunk_size);
        let mut chunk_cor = Vec::with_capacity(chunk_size);
        while chunk_orig.len() < chunk_size {
            match (originals.next(), references.next()) {
                (Some(orig), Some(cor)) => {
                    chunk_orig.push(orig.map_err(line_error(&config.orig))?);
                    chunk_cor.push(vec![cor.map_err(line_error(&config.cor))?]);
                }
                (orig, cor) => {
                    leftover = (
                        usize::from(orig.is_some()) + originals.by_ref().count(),
                        usize::from(cor.is_some()) + references.by_ref().count(),
                    );
                    exhausted = true;
                    break;
                }
            }
        }

        let records = workers.run(&processor, report.sentences, &chunk_orig, &chunk_cor)?;
        for record in &records {
            write_record(&mut writer, record)?;
            report.edits += record.edit_count();
            report.noops += record.noop_count();
        }
        report.sentences += records.len();
    }

    if leftover != (0, 0) {
        report.truncated = true;
        warn!(
            originals = report.sentences + leftover.0,
            references = report.sentences + leftover.1,
            "Input files differ in length; stopped at the shorter file"
        );
    }

    report.output_checksum = writer.finish()?;
    info!(
        sentences = report.sentences,
        edits = report.edits,
        noops = report.noops,
        "Finished"
    );
    Ok(report)
}

fn count_lines(path: &Path) -> Result<usize, M2Error> {
    let mut count = 0;
    for line in open_lines(path)? {
        line.map_err(line_error(path))?;
        count += 1;
    }
    Ok(count)
}

fn line_error(path: &Path) -> impl Fn(io::Error) -> M2Error + '_ {
    move |source| {
        M2Error::File(FileError::Io {
            path: path.display().to_string(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_legacy_flags_are_rewritten() {
        let args = normalize_legacy_args(strings(&[
            "parallel-to-m2", "-orig", "a.txt", "-cor", "b.txt", "-out", "c.m2", "-lev", "-merge", "all-split", "-j", "2",
        ]));
        assert_eq!(
            args,
            strings(&[
                "parallel-to-m2", "--orig", "a.txt", "--cor", "b.txt", "--out", "c.m2", "--lev", "--merge", "all-split", "-j", "2",
            ])
        );

        // Values and modern spellings pass through untouched
        let args = normalize_legacy_args(strings(&["x", "--orig", "-orig", "--json"]));
        assert_eq!(args, strings(&["x", "--orig", "--orig", "--json"]));
    }

    #[test]
    fn test_args_into_run_config() {
        let args = Args::parse_from(normalize_legacy_args(strings(&[
            "parallel-to-m2", "-orig", "a.txt", "-cor", "b.txt", "-out", "c.m2", "-merge", "all-equal", "--dict", "words.txt",
        ])));
        let config = RunConfig::from(args);

        assert_eq!(config.orig, PathBuf::from("a.txt"));
        assert_eq!(config.align.merge, MergeStrategy::AllEqual);
        assert!(!config.align.use_levenshtein);
        assert_eq!(config.resources.dictionary, PathBuf::from("words.txt"));
        assert_eq!(config.resources.tag_map, ResourcePaths::default().tag_map);
        assert_eq!(config.jobs, 1);
        assert!(!config.strict);
    }

    #[test]
    fn test_lev_flag_selects_levenshtein_costs() {
        for flag in ["-lev", "--lev"] {
            let args = Args::parse_from(normalize_legacy_args(strings(&[
                "parallel-to-m2", "-orig", "a.txt", "-cor", "b.txt", "-out", "c.m2", flag,
            ])));
            let config = RunConfig::from(args);
            assert!(config.align.use_levenshtein, "{}", flag);
            assert_eq!(config.align.merge, MergeStrategy::Rules);
        }
    }

    #[test]
    fn test_unknown_merge_strategy_is_rejected() {
        let result = Args::try_parse_from(strings(&[
            "parallel-to-m2", "--orig", "a", "--cor", "b", "--out", "c", "--merge", "some",
        ]));
        assert!(result.is_err());
    }

    fn write_inputs(dir: &TempDir, orig: &str, cor: &str) -> RunConfig {
        let orig_path = dir.path().join("orig.txt");
        let cor_path = dir.path().join("cor.txt");
        fs::write(&orig_path, orig).unwrap();
        fs::write(&cor_path, cor).unwrap();
        RunConfig {
            orig: orig_path,
            cor: cor_path,
            out: dir.path().join("out.m2"),
            align: AlignConfig::default(),
            resources: ResourcePaths::default(),
            strict: false,
            jobs: 1,
        }
    }

    #[test]
    fn test_run_files_writes_blocks() {
        let dir = TempDir::new().unwrap();
        let config = write_inputs(
            &dir,
            "He go to school .\nI am fine .\n",
            "He goes to school .\nI am fine .\n",
        );

        let report = run_files(&config).unwrap();
        let output = fs::read_to_string(&config.out).unwrap();

        assert_eq!(
            output,
            "S He go to school .\n\
             A 1 2|||R:VERB:SVA|||goes|||REQUIRED|||-NONE-|||0\n\
             \n\
             S I am fine .\n\
             A -1 -1|||noop|||-NONE-|||REQUIRED|||-NONE-|||0\n\
             \n"
        );
        assert_eq!(report.sentences, 2);
        assert_eq!(report.edits, 1);
        assert_eq!(report.noops, 1);
        assert!(!report.truncated);
        assert_eq!(report.output_checksum, blake3::hash(output.as_bytes()).to_hex().to_string());
    }

    #[test]
    fn test_length_mismatch_truncates_or_fails() {
        let dir = TempDir::new().unwrap();
        let mut config = write_inputs(&dir, "a .\nb .\nc .\n", "a .\nb .\n");

        let report = run_files(&config).unwrap();
        assert!(report.truncated);
        assert_eq!(report.sentences, 2);

        config.strict = true;
        match run_files(&config) {
            Err(M2Error::InputLengthMismatch { originals, references }) => {
                assert_eq!((originals, references), (3, 2));
            }
            other => panic!("Expected M2Error::InputLengthMismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_parallel_run_matches_sequential() {
        let dir = TempDir::new().unwrap();
        let orig: String = (0..300).map(|i| format!("I like cat number {} .\n", i)).collect();
        let cor: String = (0..300).map(|i| format!("I like cats number {} .\n", i)).collect();
        let mut config = write_inputs(&dir, &orig, &cor);

        let sequential = run_files(&config).unwrap();
        let expected = fs::read_to_string(&config.out).unwrap();

        config.jobs = 3;
        let parallel = run_files(&config).unwrap();
        assert_eq!(fs::read_to_string(&config.out).unwrap(), expected);
        assert_eq!(parallel.output_checksum, sequential.output_checksum);
        assert_eq!(parallel.sentences, 300);
        assert_ne!(parallel.execution_id, sequential.execution_id);
    }
}
