//! pdflayout CLI - layout reconstruction for PDF fragment dumps

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use pdflayout::fragments::ingest;
use pdflayout::layout::columns::estimate_column_count;
use pdflayout::render::{self, OutputFormat};
use pdflayout::{
    AnalyzeOptions, FragmentDump, JsonFormat, LayoutConfig, LayoutSession, PageSelection,
    PageSource, RenderOptions, StructuredDocument, StructuredPage,
};

/// Characters of block text shown by `analyze`
const PREVIEW_CHARS: usize = 50;

/// Lines of each ASCII table shown by `analyze`
const TABLE_PREVIEW_LINES: usize = 4;

#[derive(Parser)]
#[command(name = "pdflayout")]
#[command(author = "iyulab")]
#[command(version)]
#[command(about = "Reconstruct reading order, columns and tables from PDF text fragments", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Options shared by every analysis command.
#[derive(Args)]
struct AnalyzeArgs {
    /// Fragment dump (JSON) written by an extractor
    #[arg(value_name = "FILE")]
    input: PathBuf,

    /// Layout configuration file (JSON); missing keys keep their defaults
    #[arg(long, value_name = "FILE", env = "PDFLAYOUT_CONFIG")]
    config: Option<PathBuf>,

    /// Page range (e.g., "1-10", "1,3,5")
    #[arg(long)]
    pages: Option<String>,

    /// Analyze pages one at a time
    #[arg(long)]
    sequential: bool,

    /// Skip table detection
    #[arg(long)]
    no_tables: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze and write text, Markdown and JSON into a directory
    Convert {
        #[command(flatten)]
        analyze: AnalyzeArgs,

        /// Output directory
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,
    },

    /// Render as plain text with page banners
    Text {
        #[command(flatten)]
        analyze: AnalyzeArgs,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Render as Markdown
    #[command(alias = "md")]
    Markdown {
        #[command(flatten)]
        analyze: AnalyzeArgs,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Render as JSON
    Json {
        #[command(flatten)]
        analyze: AnalyzeArgs,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,

        /// Include bounding boxes and column regions
        #[arg(long)]
        coordinates: bool,
    },

    /// Inspect the columns, blocks and tables of one page
    Analyze {
        #[command(flatten)]
        analyze: AnalyzeArgs,

        /// Page number to inspect (1-indexed)
        #[arg(long, default_value_t = 1, conflicts_with = "pages")]
        page: u32,
    },

    /// Show document and layout statistics
    Info {
        #[command(flatten)]
        analyze: AnalyzeArgs,

        /// Print statistics as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Convert { analyze, output } => cmd_convert(&analyze, output.as_deref()),
        Commands::Text { analyze, output } => {
            cmd_render(&analyze, output.as_deref(), OutputFormat::Text, RenderOptions::new())
        }
        Commands::Markdown { analyze, output } => cmd_render(
            &analyze,
            output.as_deref(),
            OutputFormat::Markdown,
            RenderOptions::new(),
        ),
        Commands::Json {
            analyze,
            output,
            compact,
            coordinates,
        } => {
            let format = if compact {
                JsonFormat::Compact
            } else {
                JsonFormat::Pretty
            };
            let options = RenderOptions::new()
                .with_json_format(format)
                .with_coordinates(coordinates);
            cmd_render(&analyze, output.as_deref(), OutputFormat::Json, options)
        }
        Commands::Analyze { analyze, page } => cmd_analyze(&analyze, page),
        Commands::Info { analyze, json } => cmd_info(&analyze, json),
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn page_selection(args: &AnalyzeArgs) -> Result<PageSelection, Box<dyn std::error::Error>> {
    match args.pages.as_deref() {
        Some(p) => Ok(PageSelection::parse(p)?),
        None => Ok(PageSelection::All),
    }
}

fn load_config(args: &AnalyzeArgs) -> Result<LayoutConfig, Box<dyn std::error::Error>> {
    let config = match &args.config {
        Some(path) => LayoutConfig::from_json(&fs::read_to_string(path)?)?,
        None => LayoutConfig::default(),
    };
    Ok(if args.no_tables {
        config.without_tables()
    } else {
        config
    })
}

fn analyze(args: &AnalyzeArgs) -> Result<StructuredDocument, Box<dyn std::error::Error>> {
    let dump = Arc::new(FragmentDump::from_path(&args.input)?);
    analyze_dump(args, dump)
}

fn analyze_dump(
    args: &AnalyzeArgs,
    dump: Arc<FragmentDump>,
) -> Result<StructuredDocument, Box<dyn std::error::Error>> {
    log::debug!("Loaded {} pages from {}", dump.page_count(), args.input.display());
    let options = AnalyzeOptions::new()
        .with_parallel(!args.sequential)
        .with_pages(page_selection(args)?);

    let session = LayoutSession::with_config(dump.clone(), load_config(args)?)?
        .with_tables(dump)
        .with_options(options);
    let doc = session.analyze()?;
    session.close();
    Ok(doc)
}

fn write_or_print(output: Option<&Path>, content: &str) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(path) = output {
        fs::write(path, content)?;
        println!("{} {}", "Saved to".green(), path.display());
    } else {
        println!("{}", content);
    }
    Ok(())
}

fn cmd_render(
    args: &AnalyzeArgs,
    output: Option<&Path>,
    format: OutputFormat,
    options: RenderOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let doc = analyze(args)?;
    let content = render::render(&doc, format, &options)?;
    write_or_print(output, &content)
}

fn cmd_convert(args: &AnalyzeArgs, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let output_dir = output.map(|p| p.to_path_buf()).unwrap_or_else(|| {
        let stem = args.input.file_stem().unwrap_or_default().to_string_lossy();
        PathBuf::from(format!("{}_layout", stem))
    });
    fs::create_dir_all(&output_dir)?;

    let pb = ProgressBar::new(4);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {msg}")?
            .progress_chars("#>-"),
    );

    pb.set_message("Analyzing layout...");
    let doc = analyze(args)?;
    pb.inc(1);

    let options = RenderOptions::new().with_coordinates(true);
    let outputs = [
        (OutputFormat::Text, "Rendering text..."),
        (OutputFormat::Markdown, "Rendering Markdown..."),
        (OutputFormat::Json, "Rendering JSON..."),
    ];
    for (format, message) in outputs {
        pb.set_message(message);
        let content = render::render(&doc, format, &options)?;
        fs::write(output_dir.join(format!("layout.{}", format.extension())), content)?;
        pb.inc(1);
    }
    pb.finish_with_message("Done!");

    println!("\n{}", "Output files:".green().bold());
    println!("  {} layout.txt", "├─".dimmed());
    println!("  {} layout.md", "├─".dimmed());
    println!("  {} layout.json", "└─".dimmed());

    Ok(())
}

fn cmd_info(args: &AnalyzeArgs, as_json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let source = Arc::new(FragmentDump::from_path(&args.input)?);
    let doc = analyze_dump(args, source.clone())?;

    let blocks = doc.iter_blocks().count();
    let headings = doc.iter_blocks().filter(|(_, b)| b.is_heading()).count();
    let tables = doc.iter_tables().count();
    let words: usize = doc.iter_blocks().map(|(_, b)| b.word_count()).sum();
    let max_columns = doc.pages.iter().map(|p| p.columns.len()).max().unwrap_or(0);

    if as_json {
        let stats = serde_json::json!({
            "file": args.input.display().to_string(),
            "source_path": doc.source_path,
            "page_count": source.page_count(),
            "analyzed_pages": doc.page_count(),
            "metadata": doc.metadata,
            "blocks": blocks,
            "headings": headings,
            "tables": tables,
            "words": words,
            "max_columns": max_columns,
        });
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    println!("{}", "Document Information".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    println!("{}: {}", "File".bold(), args.input.display());
    println!("{}: {}", "Source".bold(), doc.source_path);
    println!("{}: {}", "Pages".bold(), source.page_count());
    for (key, value) in &doc.metadata {
        println!("{}: {}", capitalize(key).bold(), value);
    }

    println!();
    println!("{}", "Layout Statistics".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    println!("{}: {}", "Analyzed pages".bold(), doc.page_count());
    println!("{}: {}", "Blocks".bold(), blocks);
    println!("{}: {}", "Headings".bold(), headings);
    println!("{}: {}", "Tables".bold(), tables);
    println!("{}: {}", "Words".bold(), words);
    println!("{}: {}", "Max columns".bold(), max_columns);

    Ok(())
}

/// Analyze one page, plus a quick column estimate from its raw blocks.
fn inspect_page(
    args: &AnalyzeArgs,
    page_number: u32,
) -> Result<(StructuredPage, Option<usize>), Box<dyn std::error::Error>> {
    let dump = Arc::new(FragmentDump::from_path(&args.input)?);
    let config = load_config(args)?;
    let column_config = config.columns.clone();

    let session = LayoutSession::with_config(dump.clone(), config)?.with_tables(dump.clone());
    let page = session.analyze_page(page_number)?;
    session.close();

    // a page that fell back has no usable fragments to estimate from
    let estimate = dump
        .extract_page(page_number)
        .ok()
        .map(|fragments| estimate_column_count(&ingest(&fragments), fragments.width, &column_config));
    Ok((page, estimate))
}

fn cmd_analyze(args: &AnalyzeArgs, page_number: u32) -> Result<(), Box<dyn std::error::Error>> {
    let (page, estimate) = inspect_page(args, page_number)?;

    println!(
        "{} {} of {}",
        "Analyzing page".cyan().bold(),
        page_number,
        args.input.display()
    );
    println!("{}", "─".repeat(40).dimmed());
    println!("{}: {:.1} x {:.1}", "Page dimensions".bold(), page.width, page.height);
    if let Some(estimate) = estimate {
        println!("{}: {}", "Column estimate".bold(), estimate);
    }

    if !page.columns.is_empty() {
        println!();
        println!("{}: {}", "Columns detected".bold(), page.columns.len());
        for column in &page.columns {
            println!(
                "  Column {}: x=[{:.1}, {:.1}], {} blocks",
                column.index,
                column.bbox.x0(),
                column.bbox.x1(),
                column.blocks.len()
            );
        }
    }

    println!();
    println!("{}: {}", "Text blocks".bold(), page.block_count());
    for (i, block) in page.blocks.iter().enumerate() {
        println!(
            "  [{}] {}: {:?}",
            i,
            block.block_type.as_str().yellow(),
            preview(&block.text, PREVIEW_CHARS)
        );
    }

    println!();
    println!("{}: {}", "Tables".bold(), page.table_count());
    for (i, table) in page.tables.iter().enumerate() {
        println!("  [{}] {}x{}", i, table.num_rows, table.num_cols);
        let lines: Vec<&str> = table.ascii_representation.lines().collect();
        for line in lines.iter().take(TABLE_PREVIEW_LINES) {
            println!("      {}", line);
        }
        if lines.len() > TABLE_PREVIEW_LINES {
            println!("      {}", "...".dimmed());
        }
    }

    if !page.header.is_empty() {
        println!();
        println!("{}: {:?}", "Header".bold(), preview(&page.header, PREVIEW_CHARS));
    }
    if !page.footer.is_empty() {
        println!();
        println!("{}: {:?}", "Footer".bold(), preview(&page.footer, PREVIEW_CHARS));
    }

    Ok(())
}

/// First `max_chars` characters of `text` on one line.
fn preview(text: &str, max_chars: usize) -> String {
    let flat = text.replace('\n', " ");
    if flat.chars().count() > max_chars {
        format!("{}...", flat.chars().take(max_chars).collect::<String>())
    } else {
        flat
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
