//! armoury — render and run filter/sort clauses from the command line.
//!
//! # Usage
//!
//! ```bash
//! # Show the rendered clause and its bindings
//! armoury render -w "age > 18 & deleted_at is null" -o "-created_at, name"
//!
//! # Start numbering at $3, as if two parameters were already bound
//! armoury render -w "id in (1, 2, 3)" --start 3
//!
//! # Execute against a database
//! armoury query "SELECT id, name FROM players" -w "wins >= 10" --database-url sqlite://stats.db
//! ```

use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::*;
use tracing_subscriber::EnvFilter;

use armoury::prelude::*;

#[derive(Parser)]
#[command(name = "armoury")]
#[command(version)]
#[command(about = "Render parameterized WHERE / ORDER BY clauses", long_about = None)]
#[command(after_help = "EXAMPLES:
    armoury render -w 'age > 18 & deleted_at is null' -o '-created_at'
    armoury render -w '(region = euw | region = eune) & wins >= 10' --dialect mysql
    armoury query 'SELECT * FROM players' -w 'tier = GOLD' -o 'league_points desc'")]
struct Cli {
    /// Path to armoury.toml
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Verbose output (debug logging)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a clause without executing it
    Render {
        #[command(flatten)]
        clause: ClauseArgs,

        /// Base statement the clause is appended to
        #[arg(short, long)]
        base: Option<String>,

        /// First placeholder number
        #[arg(short, long)]
        start: Option<usize>,

        /// Placeholder dialect (postgres, mysql, sqlite, sqlserver)
        #[arg(short, long)]
        dialect: Option<Dialect>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: RenderFormat,
    },
    /// Execute a base query filtered and sorted by a clause
    Query {
        /// Base statement, e.g. "SELECT * FROM players"
        base: String,

        #[command(flatten)]
        clause: ClauseArgs,

        /// Database connection URL
        #[arg(long, env = "ARMOURY_DATABASE_URL")]
        database_url: Option<String>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "table")]
        format: OutputFormat,
    },
    /// Show the filter syntax reference
    Operators,
}

#[derive(Args)]
struct ClauseArgs {
    /// Filter expression, e.g. "age > 18 & deleted_at is null"
    #[arg(short = 'w', long = "where", default_value = "")]
    filter: String,

    /// Sort list, e.g. "-created_at, name"
    #[arg(short, long, default_value = "")]
    order: String,
}

#[derive(Clone, ValueEnum)]
enum RenderFormat {
    Text,
    Json,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        let code = match e.downcast_ref::<ArmouryError>().map(ArmouryError::kind) {
            Some(ErrorKind::InvalidArgument) => 2,
            _ => 1,
        };
        std::process::exit(code);
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "armoury=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Render {
            clause,
            base,
            start,
            dialect,
            format,
        } => {
            let start = start.unwrap_or(config.render.start_index);
            if start == 0 {
                return Err(ArmouryError::InvalidArgument(
                    "placeholder numbering starts at 1".to_string(),
                )
                .into());
            }
            let dialect = dialect.unwrap_or(config.render.dialect);
            render_clause(&clause, base.as_deref(), start, dialect, &format)
        }
        Commands::Query {
            base,
            clause,
            database_url,
            format,
        } => {
            let mut db_config = config.database;
            if database_url.is_some() {
                db_config.url = database_url;
            }
            run_query(&base, &clause, &db_config, &format).await
        }
        Commands::Operators => {
            show_operators();
            Ok(())
        }
    }
}

fn build_clause(args: &ClauseArgs) -> anyhow::Result<Clause> {
    let predicate = parse_filter(&args.filter)
        .with_context(|| format!("invalid filter '{}'", args.filter))?;
    let sort = parse_sort(&args.order).with_context(|| format!("invalid sort '{}'", args.order))?;
    Ok(Clause::new(predicate, sort))
}

fn render_clause(
    args: &ClauseArgs,
    base: Option<&str>,
    start: usize,
    dialect: Dialect,
    format: &RenderFormat,
) -> anyhow::Result<()> {
    let clause = build_clause(args)?;
    let (fragment, values) = clause.to_sql_parameterized(start, dialect);
    let sql = format!("{}{}", base.unwrap_or_default(), fragment);

    match format {
        RenderFormat::Json => {
            let out = serde_json::json!({
                "sql": sql,
                "dialect": dialect.to_string(),
                "start": start,
                "values": values,
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        RenderFormat::Text => {
            println!("{}", "Generated SQL:".green().bold());
            if sql.is_empty() {
                println!("{}", "(empty clause)".dimmed());
            } else {
                println!("{}", sql.trim_start().white());
            }

            if !values.is_empty() {
                println!();
                println!("{}", "Bindings:".cyan());
                for (i, value) in values.iter().enumerate() {
                    println!(
                        "  {} = {}",
                        format!("#{}", start + i).dimmed(),
                        value.to_string().yellow()
                    );
                }
            }
        }
    }

    Ok(())
}

async fn run_query(
    base: &str,
    args: &ClauseArgs,
    db_config: &armoury::config::DatabaseConfig,
    format: &OutputFormat,
) -> anyhow::Result<()> {
    let clause = build_clause(args)?;

    if db_config.url.is_none() {
        anyhow::bail!(ArmouryError::Config(
            "No database URL. Use --database-url or set ARMOURY_DATABASE_URL".to_string()
        ));
    }

    let store = Store::connect(db_config).await?;
    let (sql, _) = store.sql(base, &clause);
    tracing::info!(sql = %sql, "running query");

    let results = store.fetch_all(base, &clause).await?;
    format_output(&results, format)?;
    Ok(())
}

fn format_output(
    results: &[HashMap<String, serde_json::Value>],
    format: &OutputFormat,
) -> anyhow::Result<()> {
    if results.is_empty() {
        println!("{}", "(no results)".dimmed());
        return Ok(());
    }

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(results)?);
        }
        OutputFormat::Table => {
            // Get column names from first row
            let mut columns: Vec<&String> = results[0].keys().collect();
            columns.sort();

            let widths = column_widths(&columns, results);

            let header: Vec<String> = columns
                .iter()
                .map(|c| format!("{:width$}", c, width = widths[*c]))
                .collect();
            println!("{}", header.join(" │ ").white().bold());

            let sep: Vec<String> = columns.iter().map(|c| "─".repeat(widths[*c])).collect();
            println!("{}", sep.join("─┼─").dimmed());

            for row in results {
                let cells: Vec<String> = columns
                    .iter()
                    .map(|c| {
                        let val = row.get(*c).map(val_to_string).unwrap_or_default();
                        format!("{:width$}", val, width = widths[*c])
                    })
                    .collect();
                println!("{}", cells.join(" │ "));
            }

            println!();
            println!("{} row(s) returned", results.len().to_string().cyan());
        }
    }

    Ok(())
}

/// Widest cell per column, in chars. `{:width$}` pads by chars as well.
fn column_widths<'a>(
    columns: &[&'a String],
    results: &[HashMap<String, serde_json::Value>],
) -> HashMap<&'a String, usize> {
    let mut widths: HashMap<&String, usize> =
        columns.iter().map(|c| (*c, c.chars().count())).collect();
    for row in results {
        for (col, val) in row {
            let len = val_to_string(val).chars().count();
            if let Some(w) = widths.get_mut(col) {
                *w = (*w).max(len);
            }
        }
    }
    widths
}

fn val_to_string(val: &serde_json::Value) -> String {
    match val {
        serde_json::Value::Null => "NULL".to_string(),
        serde_json::Value::Bool(b) => b.to_string(),
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::String(s) => s.clone(),
        _ => val.to_string(),
    }
}

fn show_operators() {
    println!("{}", "armoury filter syntax".cyan().bold());
    println!();

    let rows = [
        ("a = v", "Equal", "a = $1"),
        ("a <> v", "Not equal (also !=)", "a <> $1"),
        ("a > v", "Greater than", "a > $1"),
        ("a >= v", "Greater or equal", "a >= $1"),
        ("a < v", "Less than", "a < $1"),
        ("a <= v", "Less or equal", "a <= $1"),
        ("a is null", "Null check", "a IS NULL"),
        ("a is not null", "Not-null check", "a IS NOT NULL"),
        ("a in (v, w)", "List membership", "a IN($1, $2)"),
        ("x & y", "Logical AND", "(x) AND (y)"),
        ("x | y", "Logical OR", "(x) OR (y)"),
        ("( ... )", "Grouping", ""),
        ("-a, b", "Sort: desc, asc", "ORDER BY a DESC, b ASC"),
    ];

    println!(
        "{:16} {:22} {}",
        "Syntax".white().bold(),
        "Meaning".white().bold(),
        "SQL".white().bold()
    );
    println!("{}", "─".repeat(64).dimmed());

    for (syntax, meaning, sql) in rows {
        println!("{:16} {:22} {}", syntax.cyan().bold(), meaning.yellow(), sql.dimmed());
    }
}
