use std::io::{self, Write};
use std::process::ExitCode;
use std::time::Instant;

use clap::Parser;
use tracing::Level;

mod cli;

use cli::{AnalyzeArgs, Cli, Commands};
use link_archive_tools::config::Config;
use link_archive_tools::error::Result;
use link_archive_tools::feed::FeedFetcher;
use link_archive_tools::tools::{
    filter, DbAnalyzer, DbMerge, FeedExportOptions, FeedExporter, ImportOptions, JsonExporter,
    JsonImporter, SearchOptions,
};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let start = Instant::now();
    let result = run(cli.command).await;
    tracing::info!("Time: {:.2?}", start.elapsed());

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn load_config() -> Config {
    Config::load().unwrap_or_else(|e| {
        tracing::warn!("Using default configuration: {}", e);
        Config::default()
    })
}

async fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Filter {
            db,
            output_db,
            bookmarked,
            votes,
            redundant,
        } => {
            let report = filter::run(&filter::FilterOptions {
                input: db,
                output: output_db,
                bookmarked,
                votes,
                redundant,
            })?;
            println!(
                "Removed {} entries and {} related rows, {} entries left",
                report.entries_removed, report.related_removed, report.entries_left
            );
        }

        Commands::Merge { inputs, output_db } => {
            let report = DbMerge::new(inputs, output_db)?.convert()?;
            println!(
                "Merged into copy of {}: {} entries copied, {} already present",
                report.base.display(),
                report.copied,
                report.skipped
            );
        }

        Commands::Feeds {
            db,
            output_db,
            output_format,
            clean,
            update_rss,
            read_internet_links,
        } => {
            let mut exporter = FeedExporter::new(FeedExportOptions {
                input: db,
                output_db,
                format: output_format,
                clean,
                update_rss,
                read_internet_links,
            })?;
            if update_rss || read_internet_links {
                let config = load_config();
                exporter = exporter
                    .with_fetcher(FeedFetcher::new(&config.user_agent, config.request_timeout())?);
            }

            let stdout = io::stdout();
            let mut out = stdout.lock();
            let report = exporter.convert(&mut out).await?;
            out.flush()?;
            tracing::info!(
                "{} entries, {} feeds, {} inserted, {} skipped",
                report.entries,
                report.feeds,
                report.inserted,
                report.skipped
            );
        }

        Commands::Db2json {
            db,
            output_dir,
            rows_max,
            format,
        } => {
            let rows_max = rows_max.unwrap_or_else(|| load_config().rows_max);
            let report = JsonExporter::new(db, output_dir, format, rows_max)?.convert()?;
            println!("Exported {} entries into {} files", report.rows, report.files.len());
        }

        Commands::Json2db {
            input_file,
            input_dir,
            output_db,
            preserve_id,
            vote_min,
        } => {
            let vote_min = vote_min.unwrap_or_else(|| load_config().vote_min);
            let importer = JsonImporter::new(ImportOptions {
                input_file,
                input_dir,
                output_db,
                preserve_id,
                vote_min,
            })?;
            let report = importer.convert()?;
            println!(
                "Files: {} ({} malformed), entries added: {} skipped: {}, sources added: {} skipped: {}",
                report.files,
                report.malformed_files,
                report.entries_added,
                report.entries_skipped,
                report.sources_added,
                report.sources_skipped
            );
        }

        Commands::Analyze(args) => analyze(args)?,
    }

    Ok(())
}

fn analyze(args: AnalyzeArgs) -> Result<()> {
    let analyzer = DbAnalyzer::new(&args.db)?;
    let stdout = io::stdout();
    let mut out = stdout.lock();

    if args.summary {
        analyzer.summary(&mut out, args.columns)?;
        return Ok(());
    }

    let display = args.display();
    let options = SearchOptions {
        search: args.search,
        table: args.table,
        order_by: args.order_by,
        ascending: args.asc && !args.desc,
        ignore_case: args.ignore_case,
        display,
    };
    let printed = analyzer.search(&mut out, &options)?;
    tracing::info!("{} rows found", printed);
    Ok(())
}
