use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

mod cli_style;

use cli_style::{
    get_prompt, get_styles, print_command_echo, print_empty, print_goodbye, print_heading,
    print_help, print_line, print_welcome, ColumnSpec, CommandGroup, CommandHelp, Notice,
    Section, Table,
};

use trackstats_server::dashboard::{compute, filter_options, global_reference};
use trackstats_server::filter::{ExplicitChoice, FilterOptions, FilterSpec};
use trackstats_server::scoring::{ArtistRanking, SimilarityOutcome};
use trackstats_server::{ComputeOptions, DashboardOutcome, DashboardReport, DatasetStore};

use rustyline::{
    completion::Completer,
    highlight::Highlighter,
    history::FileHistory,
    validate::Validator,
    CompletionType, Config, Editor, Helper,
};

fn parse_path(s: &str) -> Result<PathBuf> {
    let original_path = PathBuf::from(s);
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(original_path))
}

#[derive(Parser, Debug)]
#[command(styles=get_styles())]
struct CliArgs {
    /// Path to the SQLite tracks dataset.
    #[clap(value_parser = parse_path)]
    pub path: PathBuf,

    /// Maximum number of rows fed to the artist ranking and the hit evaluation.
    #[clap(long)]
    pub sample_row_limit: Option<usize>,
}

#[derive(Parser)]
#[command(styles=get_styles(), name = "", disable_help_subcommand = true)]
struct InnerCli {
    #[command(subcommand)]
    command: InnerCommand,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum UnknownGenreMode {
    Exclude,
    Include,
}

#[derive(Subcommand)]
enum InnerCommand {
    /// Restricts release years to an inclusive range.
    Years { from: i64, to: i64 },

    /// Restricts track popularity to an inclusive range.
    Popularity { min: i64, max: i64 },

    /// Restricts to the given genres, no arguments clears the restriction.
    Genres { genres: Vec<String> },

    /// Restricts to the given album types, no arguments clears the restriction.
    AlbumTypes { album_types: Vec<String> },

    /// Sets the explicit flag filter: all, explicit-only or non-explicit-only.
    Explicit { choice: ExplicitChoice },

    /// Excludes or includes the 'Unknown' genre in the genre rankings.
    UnknownGenre { mode: UnknownGenreMode },

    /// Goes back to the unrestricted filters.
    Reset,

    /// Shows the current filters and their compiled predicate.
    Filters,

    /// Shows the values available in the dataset.
    Options,

    /// Shows track count, distinct artists, mean popularity and median.
    Overview,

    /// Shows the popularity quantiles.
    Quantiles,

    /// Shows mean popularity per release year.
    Yearly,

    /// Shows the genres by mean popularity and by track count.
    GenresTop,

    /// Shows the Low/Medium/High popularity buckets and the explicit split.
    Buckets,

    /// Shows the artist popularity index ranking.
    Artists,

    /// Shows the rule-based hit evaluation.
    Hits,

    /// Shows the tracks closest to the reference track.
    Similar {
        #[clap(default_value_t = 10)]
        limit: usize,
    },

    /// Shows the correlation matrix of the numeric features.
    Correlation,

    /// Shows the most popular track of the whole dataset.
    Reference,

    /// Shows the path of the current dataset.
    Where,

    /// Shows this help.
    Help,

    /// Close this program.
    Exit,
}

enum CommandExecutionResult {
    Ok,
    Exit,
    Error(String),
}

struct DashboardSession {
    store: DatasetStore,
    options: FilterOptions,
    spec: FilterSpec,
    compute_options: ComputeOptions,
}

impl DashboardSession {
    /// Computes the dashboard for the current filters, `None` if nothing matched.
    fn report(&self) -> Result<Option<DashboardReport>> {
        match compute(&self.spec, &self.store, &self.compute_options)? {
            DashboardOutcome::Ready(report) => Ok(Some(*report)),
            DashboardOutcome::NoData { .. } => {
                Notice::Warning.print("No tracks match the current filters.");
                Ok(None)
            }
        }
    }
}

fn fmt_f64(value: f64) -> String {
    format!("{:.2}", value)
}

fn fmt_opt(value: Option<f64>) -> String {
    value.map(fmt_f64).unwrap_or_else(|| "-".to_string())
}

fn fmt_range((from, to): (i64, i64)) -> String {
    format!("{} - {}", from, to)
}

fn genre_label(genre: &Option<String>) -> String {
    genre.clone().unwrap_or_else(|| "(none)".to_string())
}

fn show_filters(session: &DashboardSession) {
    let spec = &session.spec;
    let join = |values: &std::collections::BTreeSet<String>| {
        if values.is_empty() {
            "(any)".to_string()
        } else {
            values.iter().cloned().collect::<Vec<_>>().join(", ")
        }
    };
    let predicate = trackstats_server::compile(spec);

    Section::open("Filters")
        .field("Years", fmt_range(spec.year_range))
        .field("Popularity", fmt_range(spec.popularity_range))
        .field("Genres", join(&spec.genres))
        .field("Album types", join(&spec.album_types))
        .field("Explicit", spec.explicit.label())
        .field(
            "Unknown genre",
            if spec.exclude_unknown_genre {
                "excluded from rankings"
            } else {
                "included"
            },
        )
        .field("WHERE", &predicate.where_sql)
        .field(
            "Params",
            serde_json::to_string(&predicate.params).unwrap_or_default(),
        )
        .close();
}

fn show_options(options: &FilterOptions) {
    Section::open("Dataset Options")
        .field("Years", fmt_range((options.min_year, options.max_year)))
        .field("Genres", options.genres.join(", "))
        .field("Album types", options.album_types.join(", "))
        .close();
}

fn show_overview(report: &DashboardReport) {
    let overview = &report.aggregates.overview;
    Section::open("Overview")
        .headline("Tracks", overview.tracks)
        .field("Distinct artists", overview.unique_artists)
        .field("Mean popularity", fmt_f64(overview.avg_popularity))
        .field("Median popularity", fmt_opt(report.aggregates.median_popularity))
        .field("Zero popularity tracks", overview.zero_popularity_count)
        .close();
}

fn show_quantiles(report: &DashboardReport) {
    let mut table = Table::new(vec![
        ColumnSpec::number("Quantile"),
        ColumnSpec::number("Popularity"),
    ]);
    for q in &report.aggregates.quantiles {
        table.row(vec![format!("{:.2}", q.quantile), q.value.to_string()]);
    }
    table.print();
}

fn show_yearly(report: &DashboardReport) {
    let mut table = Table::new(vec![
        ColumnSpec::text("Year"),
        ColumnSpec::number("Mean popularity"),
        ColumnSpec::number("Tracks"),
    ]);
    for y in &report.aggregates.yearly {
        table.row(vec![
            y.release_year.to_string(),
            fmt_f64(y.avg_popularity),
            y.num_tracks.to_string(),
        ]);
    }
    table.print();
}

fn show_genres(report: &DashboardReport) {
    print_heading("Top Genres by Mean Popularity");
    let mut table = Table::new(vec![
        ColumnSpec::text("Genre"),
        ColumnSpec::number("Mean popularity"),
        ColumnSpec::number("Tracks"),
    ]);
    for g in &report.aggregates.top_avg_genres {
        table.row(vec![
            genre_label(&g.primary_genre),
            fmt_f64(g.avg_popularity),
            g.num_tracks.to_string(),
        ]);
    }
    table.print();

    print_heading("Most Frequent Genres");
    let mut table = Table::new(vec![ColumnSpec::text("Genre"), ColumnSpec::number("Tracks")]);
    for g in &report.aggregates.genre_frequency {
        table.row(vec![genre_label(&g.primary_genre), g.num_tracks.to_string()]);
    }
    table.print();
}

fn show_buckets(report: &DashboardReport) {
    let mut table = Table::new(vec![ColumnSpec::text("Bucket"), ColumnSpec::number("Tracks")]);
    for b in &report.aggregates.popularity_buckets {
        table.row(vec![
            b.popularity_bucket.to_db_str().to_string(),
            b.num_tracks.to_string(),
        ]);
    }
    table.print();

    let mut table = Table::new(vec![
        ColumnSpec::text("Explicit"),
        ColumnSpec::number("Mean popularity"),
        ColumnSpec::number("Tracks"),
    ]);
    for e in &report.aggregates.explicit_summary {
        let label = if e.explicit { "yes" } else { "no" };
        table.row(vec![
            label.to_string(),
            fmt_f64(e.avg_popularity),
            e.num_tracks.to_string(),
        ]);
    }
    table.print();
}

fn show_artists(report: &DashboardReport) {
    match &report.artist_ranking {
        ArtistRanking::NotEnoughArtists { distinct_artists } => Notice::Warning.print(&format!(
            "Only {} distinct artists in the sample, the ranking is not meaningful.",
            distinct_artists
        )),
        ArtistRanking::Ranked { artists } => {
            let mut table = Table::new(vec![
                ColumnSpec::text("Artist"),
                ColumnSpec::number("Index"),
                ColumnSpec::number("Popularity"),
                ColumnSpec::number("Log followers"),
                ColumnSpec::number("Tracks"),
            ]);
            for a in artists {
                table.row(vec![
                    a.artist_name.clone(),
                    format!("{:.3}", a.artist_index),
                    fmt_f64(a.avg_artist_popularity),
                    fmt_f64(a.log_followers),
                    a.track_count.to_string(),
                ]);
            }
            table.print();
        }
    }
}

fn show_hits(report: &DashboardReport) {
    let e = &report.hit_evaluation;
    Section::open("Hit Evaluation")
        .field("Popularity cutoff", fmt_f64(e.popularity_cutoff))
        .field("True positives", e.true_positives)
        .field("False positives", e.false_positives)
        .field("True negatives", e.true_negatives)
        .field("False negatives", e.false_negatives)
        .headline("Accuracy", fmt_f64(e.accuracy))
        .field("Precision", fmt_f64(e.precision))
        .field("Recall", fmt_f64(e.recall))
        .close();
}

fn show_similar(report: &DashboardReport, limit: usize) {
    match &report.similarity {
        SimilarityOutcome::NoReference => {
            Notice::Warning.print("No track qualifies as reference for the current filters.")
        }
        SimilarityOutcome::Ranked { reference, ranked } => {
            Notice::Info.print(&format!(
                "Reference: {} by {}",
                reference.track_name, reference.artist_name
            ));
            let mut table = Table::new(vec![
                ColumnSpec::text("Track"),
                ColumnSpec::text("Artist"),
                ColumnSpec::number("Popularity"),
                ColumnSpec::number("Distance"),
            ]);
            for t in ranked.iter().take(limit) {
                table.row(vec![
                    t.track_name.clone(),
                    t.artist_name.clone(),
                    t.track_popularity.to_string(),
                    format!("{:.4}", t.similarity),
                ]);
            }
            table.print();
        }
    }
}

fn show_correlation(report: &DashboardReport) {
    let matrix = &report.correlation;
    let mut columns = vec![ColumnSpec::text("")];
    columns.extend(matrix.features.iter().map(|f| ColumnSpec::number(f)));
    let mut table = Table::new(columns);
    for (feature, row) in matrix.features.iter().zip(&matrix.values) {
        let mut cells = vec![feature.clone()];
        cells.extend(row.iter().map(|v| fmt_opt(*v)));
        table.row(cells);
    }
    table.print();
}

fn show_reference(store: &DatasetStore) -> Result<()> {
    match global_reference(store)? {
        None => print_empty("The dataset is empty."),
        Some(track) => {
            Section::open("Global Reference Track")
                .headline("Track", &track.track_name)
                .field("Artist", &track.artist_name)
                .field("Popularity", track.track_popularity)
                .field("Artist popularity", track.artist_popularity)
                .field("Followers", track.artist_followers)
                .close();
        }
    }
    Ok(())
}

/// Help heading of a REPL command.
fn command_group(name: &str) -> &'static str {
    match name {
        "years" | "popularity" | "genres" | "album-types" | "explicit" | "unknown-genre"
        | "reset" => "Filters",
        "filters" | "options" => "Inspection",
        "where" | "help" | "exit" => "Session",
        _ => "Results",
    }
}

fn command_help() -> Vec<CommandGroup> {
    let mut groups: Vec<CommandGroup> = ["Filters", "Inspection", "Results", "Session"]
        .into_iter()
        .map(|title| CommandGroup {
            title,
            commands: Vec::new(),
        })
        .collect();
    for sc in InnerCli::command().get_subcommands() {
        let help = CommandHelp {
            name: sc.get_name().to_string(),
            args: sc
                .get_positionals()
                .map(|a| format!("<{}>", a.get_id()))
                .collect::<Vec<_>>()
                .join(" "),
            description: sc.get_about().map(|a| a.to_string()).unwrap_or_default(),
        };
        let title = command_group(&help.name);
        if let Some(group) = groups.iter_mut().find(|g| g.title == title) {
            group.commands.push(help);
        }
    }
    groups
}

fn run_command(
    command: InnerCommand,
    session: &mut DashboardSession,
) -> Result<CommandExecutionResult> {
    match command {
        InnerCommand::Years { from, to } => {
            session.spec.year_range = (from, to);
            Notice::Success.print(&format!("Years set to {} - {}", from, to));
        }
        InnerCommand::Popularity { min, max } => {
            session.spec.popularity_range = (min, max);
            Notice::Success.print(&format!("Popularity set to {} - {}", min, max));
        }
        InnerCommand::Genres { genres } => {
            for genre in genres.iter().filter(|g| !session.options.genres.contains(g)) {
                Notice::Warning.print(&format!(
                    "Genre '{}' does not occur in the dataset",
                    genre
                ));
            }
            session.spec.genres = genres.into_iter().collect();
            Notice::Success.print("Genres updated");
        }
        InnerCommand::AlbumTypes { album_types } => {
            for album_type in album_types
                .iter()
                .filter(|a| !session.options.album_types.contains(a))
            {
                Notice::Warning.print(&format!(
                    "Album type '{}' does not occur in the dataset",
                    album_type
                ));
            }
            session.spec.album_types = album_types.into_iter().collect();
            Notice::Success.print("Album types updated");
        }
        InnerCommand::Explicit { choice } => {
            session.spec.explicit = choice;
            Notice::Success.print(&format!("Explicit filter set to {}", choice));
        }
        InnerCommand::UnknownGenre { mode } => {
            session.spec.exclude_unknown_genre = matches!(mode, UnknownGenreMode::Exclude);
            Notice::Success.print("Unknown genre handling updated");
        }
        InnerCommand::Reset => {
            session.spec = FilterSpec::unrestricted(&session.options);
            Notice::Success.print("Filters reset");
        }
        InnerCommand::Filters => show_filters(session),
        InnerCommand::Options => show_options(&session.options),
        InnerCommand::Overview => {
            if let Some(report) = session.report()? {
                show_overview(&report);
            }
        }
        InnerCommand::Quantiles => {
            if let Some(report) = session.report()? {
                show_quantiles(&report);
            }
        }
        InnerCommand::Yearly => {
            if let Some(report) = session.report()? {
                show_yearly(&report);
            }
        }
        InnerCommand::GenresTop => {
            if let Some(report) = session.report()? {
                show_genres(&report);
            }
        }
        InnerCommand::Buckets => {
            if let Some(report) = session.report()? {
                show_buckets(&report);
            }
        }
        InnerCommand::Artists => {
            if let Some(report) = session.report()? {
                show_artists(&report);
            }
        }
        InnerCommand::Hits => {
            if let Some(report) = session.report()? {
                show_hits(&report);
            }
        }
        InnerCommand::Similar { limit } => {
            if let Some(report) = session.report()? {
                show_similar(&report, limit);
            }
        }
        InnerCommand::Correlation => {
            if let Some(report) = session.report()? {
                show_correlation(&report);
            }
        }
        InnerCommand::Reference => show_reference(&session.store)?,
        InnerCommand::Where => print_line(&session.store.path().display().to_string()),
        InnerCommand::Help => print_help(&command_help()),
        InnerCommand::Exit => return Ok(CommandExecutionResult::Exit),
    }
    Ok(CommandExecutionResult::Ok)
}

fn execute_command(line: String, session: &mut DashboardSession) -> CommandExecutionResult {
    if line.is_empty() {
        return CommandExecutionResult::Ok;
    }

    let args =
        shlex::split(&line).unwrap_or_else(|| line.split_whitespace().map(String::from).collect());

    let cli = InnerCli::try_parse_from(std::iter::once(" ").chain(args.iter().map(String::as_str)));

    match cli {
        Ok(cli) => {
            print_command_echo(&line);
            match run_command(cli.command, session) {
                Ok(result) => result,
                Err(err) => CommandExecutionResult::Error(format!("{:#}", err)),
            }
        }
        Err(e) => {
            if e.print().is_err() {
                println!("{}", e);
            }
            CommandExecutionResult::Ok
        }
    }
}

#[derive(rustyline_derive::Hinter)]
struct MyHelper {
    commands_names: Vec<String>,
}

impl MyHelper {
    pub fn new() -> Self {
        let commands_names: Vec<String> = InnerCli::command()
            .get_subcommands()
            .map(|sc| sc.get_name().to_string())
            .collect();

        MyHelper { commands_names }
    }
}

impl Completer for MyHelper {
    type Candidate = String;

    fn complete(
        &self,
        line: &str,
        _pos: usize,
        _ctx: &rustyline::Context<'_>,
    ) -> rustyline::Result<(usize, Vec<String>)> {
        if line.contains(" ") {
            return Ok((0, Vec::with_capacity(0)));
        }
        let matches = self
            .commands_names
            .iter()
            .filter(|c| c.starts_with(line))
            .map(|c| c.to_string())
            .collect::<Vec<_>>();

        Ok((0, matches))
    }
}

impl Highlighter for MyHelper {}
impl Validator for MyHelper {}
impl Helper for MyHelper {}

fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    let store = DatasetStore::open(&cli_args.path)
        .with_context(|| format!("Could not open dataset {:?}", cli_args.path))?;
    let counts = store.counts()?;
    let options = filter_options(&store)?;
    let mut session = DashboardSession {
        spec: FilterSpec::unrestricted(&options),
        options,
        store,
        compute_options: ComputeOptions {
            sample_row_limit: cli_args.sample_row_limit,
        },
    };

    let config = Config::builder()
        .completion_type(CompletionType::List)
        .build();

    let mut rl = Editor::<MyHelper, FileHistory>::with_config(config)?;
    rl.set_helper(Some(MyHelper::new()));
    let _ = rl.clear_screen();

    print_welcome(
        &session.store.path().display().to_string(),
        counts.artists,
        counts.tracks,
    );

    loop {
        let readline = rl.readline(&get_prompt());

        match readline {
            Ok(line) => {
                let _ = rl.add_history_entry(&line);
                match execute_command(line, &mut session) {
                    CommandExecutionResult::Ok => {}
                    CommandExecutionResult::Exit => {
                        break;
                    }
                    CommandExecutionResult::Error(err) => {
                        Notice::Error.print(&err);
                        continue;
                    }
                }
            }
            Err(rustyline::error::ReadlineError::Interrupted) => {
                println!("CTRL-C");
                break;
            }
            Err(rustyline::error::ReadlineError::Eof) => {
                println!("CTRL-D: exiting.");
                break;
            }
            Err(e) => {
                Notice::Error.print(&format!("{:?}", e));
                break;
            }
        }
    }
    print_goodbye();
    Ok(())
}
