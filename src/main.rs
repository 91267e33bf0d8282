use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use notify::{EventKind, RecursiveMode, Watcher};
use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

use ripple::config::Config;
use ripple::core::{
    build_impact_analysis, AnalysisSession, Debouncer, FileLineReader, ImpactAnalysis,
    ImpactAnalyzer, LineSource, Position, ReferenceLocation, SourceLocation, SymbolResolver,
    TextReferenceFinder,
};
use ripple::formatters::{DotFormatter, JsonFormatter, TreeFormatter};
use ripple::Error;

#[derive(Debug, Clone, Parser)]
#[command(
    name = "ripple",
    version,
    author = "ripple developers",
    about = "Symbol impact analysis - see what a change to one symbol touches"
)]
struct Cli {
    /// Workspace root searched for references (defaults to current directory)
    #[arg(short, long, global = true, value_name = "DIR")]
    root: Option<PathBuf>,

    /// Verbose output (can be repeated: -v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Subcommand)]
enum Commands {
    /// Analyze the symbol at a position once
    Analyze {
        /// Symbol position as FILE:LINE:COLUMN (1-based)
        target: String,

        /// Symbol name, when it cannot be read from the target position
        #[arg(short, long)]
        symbol: Option<String>,

        /// JSON array of reference locations from an external resolver
        #[arg(long, value_name = "FILE")]
        references: Option<PathBuf>,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Re-analyze whenever files under the root change
    Watch {
        /// Symbol position as FILE:LINE:COLUMN (1-based)
        target: String,

        /// Quiet period before re-analysis, in milliseconds
        #[arg(long, value_name = "MS")]
        debounce_ms: Option<u64>,

        #[command(flatten)]
        output: OutputArgs,
    },
}

#[derive(Debug, Clone, clap::Args)]
struct OutputArgs {
    /// Output format: json, tree, dot
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
    format: OutputFormat,

    /// Pretty-print JSON output
    #[arg(long)]
    pretty: bool,

    /// Write to a file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, ValueEnum)]
#[value(rename_all = "kebab-case")]
enum OutputFormat {
    Json,
    Tree,
    Dot,
}

impl OutputArgs {
    fn render(&self, analysis: &ImpactAnalysis) -> Result<String> {
        match self.format {
            OutputFormat::Json => JsonFormatter::new()
                .with_pretty(self.pretty)
                .format_analysis(analysis),
            OutputFormat::Tree => TreeFormatter::new().format_analysis(analysis),
            OutputFormat::Dot => DotFormatter::new().format_analysis(analysis),
        }
    }

    fn emit(&self, analysis: &ImpactAnalysis) -> Result<()> {
        let rendered = self.render(analysis)?;
        match &self.output {
            Some(path) => std::fs::write(path, rendered)
                .with_context(|| format!("failed to write {}", path.display()))?,
            None => println!("{}", rendered.trim_end()),
        }
        Ok(())
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    run(cli)
}

fn run(cli: Cli) -> Result<()> {
    let root = match cli.root {
        Some(root) => root,
        None => std::env::current_dir().context("failed to get current directory")?,
    };
    let root = root
        .canonicalize()
        .with_context(|| format!("workspace root {} is not accessible", root.display()))?;
    let config = Config::load(&root)?;

    match cli.command {
        Commands::Analyze {
            target,
            symbol,
            references,
            output,
        } => analyze(&root, &config, &target, symbol, references, &output),
        Commands::Watch {
            target,
            debounce_ms,
            output,
        } => {
            let delay = debounce_ms.map_or_else(|| config.debounce(), Duration::from_millis);
            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(watch(root, config, target, delay, output))
        }
    }
}

/// Parse `FILE:LINE:COLUMN` (1-based) into a canonical path and a zero-based position.
fn parse_target(target: &str) -> Result<(PathBuf, Position)> {
    let mut parts = target.rsplitn(3, ':');
    let (Some(column), Some(line), Some(file)) = (parts.next(), parts.next(), parts.next()) else {
        bail!("target `{target}` must look like FILE:LINE:COLUMN");
    };
    let line: usize = line
        .parse()
        .with_context(|| format!("invalid line `{line}` in `{target}`"))?;
    let column: usize = column
        .parse()
        .with_context(|| format!("invalid column `{column}` in `{target}`"))?;
    if line == 0 || column == 0 {
        bail!("line and column in `{target}` are 1-based");
    }
    let file = Path::new(file)
        .canonicalize()
        .with_context(|| format!("cannot open {file}"))?;
    Ok((file, Position::new(line - 1, column - 1)))
}

/// The user-facing notice for outcomes that are not failures.
fn notice(err: &Error) -> Option<String> {
    match err {
        Error::NoSymbol { .. } => Some("No symbol found at the given position.".to_string()),
        Error::NoReferences { symbol } => Some(format!("No references found for '{symbol}'.")),
        _ => None,
    }
}

fn analyze(
    root: &Path,
    config: &Config,
    target: &str,
    symbol: Option<String>,
    references: Option<PathBuf>,
    output: &OutputArgs,
) -> Result<()> {
    let start_time = Instant::now();
    let (file, position) = parse_target(target)?;
    let finder = TextReferenceFinder::new(root, config);
    let lines = FileLineReader::new().with_max_file_bytes(config.max_file_bytes);

    let result = match references {
        Some(references_path) => {
            let references = load_references(&references_path)?;
            analyze_references(&file, position, symbol, &references, &finder, &lines)
        }
        None => {
            if symbol.is_some() {
                warn!("--symbol is only used with --references; reading the symbol from the target");
            }
            ImpactAnalyzer::new(finder, lines).analyze(&file, position)
        }
    };

    match result {
        Ok(analysis) => {
            output.emit(&analysis)?;
            debug!(
                elapsed_ms = start_time.elapsed().as_millis() as u64,
                "analysis emitted"
            );
            Ok(())
        }
        Err(err) => match notice(&err) {
            Some(message) => {
                println!("{message}");
                Ok(())
            }
            None => Err(err.into()),
        },
    }
}

fn load_references(path: &Path) -> Result<Vec<ReferenceLocation>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("{} is not a reference list", path.display()))
}

/// Build from externally resolved references. The symbol defaults to the word at `position`.
fn analyze_references(
    file: &Path,
    position: Position,
    symbol: Option<String>,
    references: &[ReferenceLocation],
    resolver: &dyn SymbolResolver,
    lines: &dyn LineSource,
) -> ripple::Result<ImpactAnalysis> {
    let symbol = match symbol {
        Some(symbol) => symbol,
        None => resolver
            .word_at(file, position)?
            .ok_or_else(|| Error::NoSymbol {
                file: file.to_path_buf(),
                line: position.line,
                column: position.column,
            })?,
    };
    let source = SourceLocation::new(file, position.line);
    build_impact_analysis(&symbol, &source, references, lines)
}

/// Absolute form of a file that may not exist yet: its parent directory is canonicalized.
fn resolve_output_path(path: &Path) -> Result<PathBuf> {
    let file_name = path
        .file_name()
        .with_context(|| format!("output path {} has no file name", path.display()))?;
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => std::env::current_dir().context("failed to get current directory")?,
    };
    let parent = parent
        .canonicalize()
        .with_context(|| format!("output directory {} is not accessible", parent.display()))?;
    Ok(parent.join(file_name))
}

/// Decides which file-system events warrant a re-analysis.
struct WatchFilter {
    root: PathBuf,
    exclude: HashSet<String>,
    output: Option<PathBuf>,
}

impl WatchFilter {
    fn new(root: &Path, config: &Config, output: Option<PathBuf>) -> Self {
        Self {
            root: root.to_path_buf(),
            exclude: config.exclude.iter().cloned().collect(),
            output,
        }
    }

    fn is_relevant(&self, path: &Path) -> bool {
        if self.output.as_deref() == Some(path) {
            return false;
        }
        let relative = path.strip_prefix(&self.root).unwrap_or(path);
        !relative.components().any(|component| match component {
            Component::Normal(name) => name
                .to_str()
                .is_some_and(|name| self.exclude.contains(name)),
            _ => false,
        })
    }

    fn should_trigger(&self, event: &notify::Event) -> bool {
        matches!(
            event.kind,
            EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
        ) && event.paths.iter().any(|path| self.is_relevant(path))
    }
}

async fn watch(
    root: PathBuf,
    config: Config,
    target: String,
    delay: Duration,
    output: OutputArgs,
) -> Result<()> {
    let (file, position) = parse_target(&target)?;
    let analyzer = Arc::new(ImpactAnalyzer::new(
        TextReferenceFinder::new(&root, &config),
        FileLineReader::new().with_max_file_bytes(config.max_file_bytes),
    ));
    let session = Arc::new(AnalysisSession::new());
    let (trigger, mut debouncer) = Debouncer::new(delay);

    let output_path = output.output.as_deref().map(resolve_output_path).transpose()?;
    let filter = WatchFilter::new(&root, &config, output_path);
    let watch_trigger = trigger.clone();
    let mut watcher = notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
        match res {
            Ok(event) if filter.should_trigger(&event) => {
                watch_trigger.fire();
            }
            Ok(_) => {}
            Err(err) => warn!(error = %err, "file watcher error"),
        }
    })
    .context("failed to start file watcher")?;
    watcher
        .watch(&root, RecursiveMode::Recursive)
        .with_context(|| format!("failed to watch {}", root.display()))?;

    println!("Watching {} (debounce {}ms)", root.display(), delay.as_millis());
    trigger.fire();

    while debouncer.settled().await {
        let ticket = session.begin();
        let analyzer = Arc::clone(&analyzer);
        let session = Arc::clone(&session);
        let output = output.clone();
        let file = file.clone();

        tokio::spawn(async move {
            let outcome = tokio::task::spawn_blocking(move || {
                analyzer.lines().clear();
                analyzer.analyze(&file, position)
            })
            .await;

            match outcome {
                Ok(Ok(analysis)) => {
                    if session.apply(ticket, analysis) {
                        if let Some(current) = session.current() {
                            if let Err(err) = output.emit(&current) {
                                warn!(error = %err, "failed to emit analysis");
                            }
                        }
                    }
                }
                Ok(Err(err)) => match notice(&err) {
                    Some(message) if session.is_latest(ticket) => println!("{message}"),
                    Some(_) => debug!(error = %err, "discarding superseded notice"),
                    None => warn!(error = %err, "analysis failed"),
                },
                Err(err) => warn!(error = %err, "analysis task panicked"),
            }
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{AccessKind, CreateKind, ModifyKind};
    use notify::Event;
    use ripple::core::NodeType;

    fn workspace() -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().canonicalize().unwrap();
        std::fs::write(root.join("a.ts"), "export function foo() {}\nfoo();\n").unwrap();
        (dir, root)
    }

    #[test]
    fn parse_target_converts_to_zero_based() {
        let (_dir, root) = workspace();
        let target = format!("{}:2:3", root.join("a.ts").display());

        let (file, position) = parse_target(&target).unwrap();
        assert_eq!(file, root.join("a.ts"));
        assert_eq!(position, Position::new(1, 2));
    }

    #[test]
    fn parse_target_rejects_malformed_input() {
        let (_dir, root) = workspace();
        let file = root.join("a.ts");

        assert!(parse_target("a.ts").is_err());
        assert!(parse_target(&format!("{}:x:1", file.display())).is_err());
        assert!(parse_target(&format!("{}:0:1", file.display())).is_err());
        assert!(parse_target(&format!("{}:1:0", file.display())).is_err());
        assert!(parse_target(&format!("{}:1:1", root.join("missing.ts").display())).is_err());
    }

    #[test]
    fn notices_cover_only_non_failures() {
        let no_symbol = Error::NoSymbol {
            file: PathBuf::from("a.ts"),
            line: 0,
            column: 0,
        };
        assert_eq!(
            notice(&no_symbol).as_deref(),
            Some("No symbol found at the given position.")
        );

        let no_refs = Error::NoReferences {
            symbol: "foo".to_string(),
        };
        assert_eq!(
            notice(&no_refs).as_deref(),
            Some("No references found for 'foo'.")
        );

        assert_eq!(notice(&Error::Lookup("server gone".to_string())), None);
    }

    #[test]
    fn reference_file_drives_the_build() {
        let (_dir, root) = workspace();
        let file = root.join("a.ts");
        let list = root.join("refs.json");
        let json = serde_json::json!([
            {"file": file, "line": 0},
            {"file": "other.ts", "line": 4, "text": "class Bar extends foo {}"},
            {"file": "other.ts", "line": 9, "text": "foo();"}
        ]);
        std::fs::write(&list, json.to_string()).unwrap();

        let references = load_references(&list).unwrap();
        let finder = TextReferenceFinder::new(&root, &Config::default());
        let lines = FileLineReader::new();
        let analysis =
            analyze_references(&file, Position::new(0, 17), None, &references, &finder, &lines)
                .unwrap();

        assert_eq!(analysis.symbol_name, "foo");
        assert_eq!(analysis.affected_files, 2);
        assert_eq!(analysis.total_references, 3);
        let types: Vec<_> = analysis.children_of("file-1").map(|n| n.node_type).collect();
        assert_eq!(types, vec![NodeType::Class, NodeType::Function]);
    }

    #[test]
    fn reference_file_without_a_symbol_is_a_notice() {
        let (_dir, root) = workspace();
        let file = root.join("a.ts");
        let finder = TextReferenceFinder::new(&root, &Config::default());
        let lines = FileLineReader::new();
        let references = vec![ReferenceLocation::new(&file, 0)];

        let result =
            analyze_references(&file, Position::new(1, 5), None, &references, &finder, &lines);
        assert!(matches!(result, Err(Error::NoSymbol { line: 1, column: 5, .. })));

        let named = analyze_references(
            &file,
            Position::new(1, 5),
            Some("foo".to_string()),
            &references,
            &finder,
            &lines,
        )
        .unwrap();
        assert_eq!(named.symbol_name, "foo");
    }

    #[test]
    fn malformed_reference_file_is_an_error() {
        let (_dir, root) = workspace();
        let list = root.join("refs.json");
        std::fs::write(&list, "{\"not\": \"a list\"}").unwrap();

        assert!(load_references(&list).is_err());
        assert!(load_references(&root.join("missing.json")).is_err());
    }

    #[test]
    fn output_paths_resolve_to_absolute_form() {
        let (_dir, root) = workspace();
        std::fs::create_dir(root.join("sub")).unwrap();

        let dotted = resolve_output_path(&root.join("./impact.json")).unwrap();
        let climbed = resolve_output_path(&root.join("sub/../impact.json")).unwrap();
        assert_eq!(dotted, root.join("impact.json"));
        assert_eq!(climbed, root.join("impact.json"));
        assert!(resolve_output_path(Path::new("/")).is_err());
    }

    #[test]
    fn watch_filter_ignores_output_and_excluded_dirs() {
        let (_dir, root) = workspace();
        std::fs::create_dir(root.join("sub")).unwrap();
        let output = resolve_output_path(&root.join("sub/../impact.json")).unwrap();
        let filter = WatchFilter::new(&root, &Config::default(), Some(output));

        let modify = |path: PathBuf| Event::new(EventKind::Modify(ModifyKind::Any)).add_path(path);

        assert!(filter.should_trigger(&modify(root.join("a.ts"))));
        assert!(filter.should_trigger(&modify(root.join("src/deep/b.ts"))));
        assert!(!filter.should_trigger(&modify(root.join("impact.json"))));
        assert!(!filter.should_trigger(&modify(root.join(".git/index"))));
        assert!(!filter.should_trigger(&modify(root.join("target/debug/ripple"))));
        assert!(!filter.should_trigger(&modify(root.join("web/node_modules/x/index.js"))));
        let access = Event::new(EventKind::Access(AccessKind::Any)).add_path(root.join("a.ts"));
        assert!(!filter.should_trigger(&access));

        let mixed = Event::new(EventKind::Create(CreateKind::File))
            .add_path(root.join("impact.json"))
            .add_path(root.join("a.ts"));
        assert!(filter.should_trigger(&mixed));
    }
}
