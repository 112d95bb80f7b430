use chrono::{DateTime, NaiveDate, Utc};
use clap::{Args, Parser, Subcommand};
use ezlift_core::*;
use std::{path::PathBuf, sync::Arc};

#[derive(Parser)]
#[command(name = "ezlift")]
#[command(about = "EZLift workout statistics from exported training data", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Use this config file instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Evaluate relative dates against this instant (RFC 3339)
    #[arg(long, global = true, hide = true)]
    now: Option<DateTime<Utc>>,
}

#[derive(Args, Clone)]
struct RangeArgs {
    /// First day to include (YYYY-MM-DD)
    #[arg(long)]
    from: Option<NaiveDate>,

    /// Last day to include (YYYY-MM-DD)
    #[arg(long)]
    to: Option<NaiveDate>,

    /// Number of weeks back from today when no explicit range is given (0 for all history)
    #[arg(long, default_value_t = 12)]
    weeks: u32,
}

impl RangeArgs {
    fn resolve(&self, now: DateTime<Utc>) -> Result<DateRange> {
        if self.from.is_none() && self.to.is_none() {
            return Ok(match self.weeks {
                0 => DateRange::all_time(now),
                weeks => DateRange::last_weeks(weeks, now),
            });
        }
        DateRange::new(
            self.from.unwrap_or(NaiveDate::MIN),
            self.to.unwrap_or_else(|| now.date_naive()),
        )
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Sets and volume per ISO week
    Weekly {
        /// Session export (JSON or JSON Lines)
        #[arg(long)]
        sessions: PathBuf,

        #[command(flatten)]
        range: RangeArgs,
    },

    /// Best set per exercise
    Records {
        #[arg(long)]
        sessions: PathBuf,

        #[command(flatten)]
        range: RangeArgs,
    },

    /// This week against last week, plus recent workouts
    Summary {
        #[arg(long)]
        sessions: PathBuf,

        /// Number of recent workouts to list
        #[arg(long, default_value_t = 5)]
        limit: usize,
    },

    /// Per-session progress for one exercise
    Progress {
        #[arg(long)]
        sessions: PathBuf,

        /// Exercise id or name
        #[arg(long)]
        exercise: String,

        #[command(flatten)]
        range: RangeArgs,
    },

    /// Estimated one-rep max for a set
    OneRepMax {
        #[arg(long)]
        weight: f64,

        #[arg(long)]
        reps: u32,
    },

    /// Next workout of the active routine
    NextWorkout {
        /// Routine export (JSON)
        #[arg(long)]
        routine: PathBuf,

        #[arg(long)]
        sessions: Option<PathBuf>,
    },

    /// Write weekly volume to CSV
    Export {
        #[arg(long)]
        sessions: PathBuf,

        /// Destination CSV file
        #[arg(long)]
        out: PathBuf,

        #[command(flatten)]
        range: RangeArgs,
    },

    /// Browse the cached exercise library
    Exercises {
        /// Refresh the cache from an exercise export first
        #[arg(long)]
        import: Option<PathBuf>,

        /// Name contains this text
        #[arg(long)]
        query: Option<String>,

        #[arg(long)]
        muscle: Option<String>,

        #[arg(long)]
        equipment: Option<String>,
    },
}

fn main() -> Result<()> {
    ezlift_core::logging::init_with_level("warn");

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    if let Some(data_dir) = cli.data_dir {
        config.data.data_dir = data_dir;
    }
    let now = cli.now.unwrap_or_else(Utc::now);
    tracing::debug!("Data directory: {:?}, now: {}", config.data.data_dir, now);

    match cli.command {
        Commands::Weekly { sessions, range } => cmd_weekly(sessions, range.resolve(now)?, now),
        Commands::Records { sessions, range } => {
            cmd_records(sessions, range.resolve(now)?, now, &config)
        }
        Commands::Summary { sessions, limit } => cmd_summary(sessions, limit, now),
        Commands::Progress {
            sessions,
            exercise,
            range,
        } => cmd_progress(sessions, &exercise, range.resolve(now)?),
        Commands::OneRepMax { weight, reps } => cmd_one_rep_max(weight, reps),
        Commands::NextWorkout { routine, sessions } => cmd_next_workout(routine, sessions),
        Commands::Export {
            sessions,
            out,
            range,
        } => cmd_export(sessions, out, range.resolve(now)?, now),
        Commands::Exercises {
            import,
            query,
            muscle,
            equipment,
        } => cmd_exercises(
            import,
            ExerciseFilter {
                query,
                muscle_group: muscle,
                equipment,
            },
            now,
            &config,
        ),
    }
}

fn cmd_weekly(sessions: PathBuf, range: DateRange, now: DateTime<Utc>) -> Result<()> {
    let sessions = load_sessions(&sessions)?;
    let weeks = aggregate_by_week(&sessions, &range, now);

    if weeks.is_empty() {
        println!("No sessions between {} and {}.", range.start, range.end);
        return Ok(());
    }

    println!("{:<12} {:>6} {:>12}", "Week of", "Sets", "Volume");
    for week in &weeks {
        let marker = if week.is_current { "  ← this week" } else { "" };
        println!(
            "{:<12} {:>6} {:>12.1}{}",
            week.week_start, week.total_sets, week.total_volume, marker
        );
    }

    Ok(())
}

fn cmd_records(
    sessions: PathBuf,
    range: DateRange,
    now: DateTime<Utc>,
    config: &Config,
) -> Result<()> {
    let sessions = load_sessions(&sessions)?;
    let records = calculate_personal_records(&sessions, &range, now, &config.stats);

    if records.is_empty() {
        println!("No personal records yet.");
        return Ok(());
    }

    println!("Personal records");
    for (i, record) in records.iter().enumerate() {
        let recent = if record.is_recent { " (new)" } else { "" };
        println!(
            "  {}. {}: {} × {} = {:.1} on {}{}",
            i + 1,
            record.exercise_name,
            record.weight,
            record.reps,
            record.volume,
            record.date.format("%Y-%m-%d"),
            recent
        );
    }

    Ok(())
}

fn cmd_summary(sessions: PathBuf, limit: usize, now: DateTime<Utc>) -> Result<()> {
    let sessions = load_sessions(&sessions)?;
    let metrics = aggregate_weekly_metrics(&sessions, now);

    println!("Week of {}", metrics.week_start);
    println!(
        "  Workouts: {} (last week {})",
        metrics.current.workouts, metrics.previous.workouts
    );
    println!(
        "  Sets: {} (last week {})",
        metrics.current.sets, metrics.previous.sets
    );
    println!(
        "  Volume: {:.1} (last week {:.1})",
        metrics.current.volume, metrics.previous.volume
    );
    match metrics.volume_change_pct {
        Some(pct) => println!("  Change: {:+.1}%", pct),
        None => println!("  Change: n/a"),
    }

    let recent = summarize_recent(&sessions, now, limit);
    if !recent.is_empty() {
        println!();
        println!("Recent workouts");
        for summary in &recent {
            println!(
                "  {:<12} {} - {} exercises, {} sets, {:.1} volume",
                summary.relative_date,
                summary.name,
                summary.exercise_count,
                summary.set_count,
                summary.volume
            );
        }
    }

    Ok(())
}

fn cmd_progress(sessions: PathBuf, exercise: &str, range: DateRange) -> Result<()> {
    let sessions = load_sessions(&sessions)?;
    let points = exercise_progress(&sessions, exercise, &range);

    if points.is_empty() {
        println!("No loaded sets found for {}.", exercise);
        return Ok(());
    }

    println!("{:<12} {:>10} {:>10} {:>12}", "Date", "Best", "Est. 1RM", "Volume");
    for point in &points {
        println!(
            "{:<12} {:>10.1} {:>10.1} {:>12.1}",
            point.date.format("%Y-%m-%d"),
            point.best_weight,
            point.estimated_1rm,
            point.volume
        );
    }

    Ok(())
}

fn cmd_one_rep_max(weight: f64, reps: u32) -> Result<()> {
    let estimate = calculate_estimated_1rm(weight, reps);
    println!("Estimated 1RM: {:.1}", estimate);
    if reps > 30 {
        println!("  (more than 30 reps; showing the lifted weight)");
    }
    Ok(())
}

fn cmd_next_workout(routine: PathBuf, sessions: Option<PathBuf>) -> Result<()> {
    let routines = load_routines(&routine)?;
    let sessions = match sessions {
        Some(path) => load_sessions(&path)?,
        None => Vec::new(),
    };

    let routine = match active_routine(&routines) {
        Some(r) => r,
        None => {
            println!("No routine found.");
            return Ok(());
        }
    };

    match next_workout(routine, &sessions) {
        Some(workout) => {
            println!("Program: {}", routine.name);
            println!("Next workout: {}", workout.name);
        }
        None => println!("Routine {} has no workouts.", routine.name),
    }

    Ok(())
}

fn cmd_export(sessions: PathBuf, out: PathBuf, range: DateRange, now: DateTime<Utc>) -> Result<()> {
    let sessions = load_sessions(&sessions)?;
    let weeks = aggregate_by_week(&sessions, &range, now);
    let count = ezlift_core::export::write_weekly_csv(&weeks, &out)?;

    println!("✓ Exported {} weeks to {}", count, out.display());
    Ok(())
}

fn cmd_exercises(
    import: Option<PathBuf>,
    mut filter: ExerciseFilter,
    now: DateTime<Utc>,
    config: &Config,
) -> Result<()> {
    let store = ExerciseStore::new(config.exercise_cache_path(), config.cache.exercise_ttl());

    let exercises = match import {
        Some(path) => {
            let exercises = load_exercises(&path)?;
            store.save(&exercises, now)?;
            println!("✓ Cached {} exercises", exercises.len());
            exercises
        }
        None => match store.load_fresh(now) {
            Some(exercises) => exercises,
            None => {
                eprintln!("Exercise library cache is empty or expired. Run with --import <file>.");
                return Ok(());
            }
        },
    };

    let exercises = match filter.query.take().filter(|q| !q.trim().is_empty()) {
        Some(term) => search_exercises(exercises, &term, config)?,
        None => exercises,
    };

    let matches = filter_exercises(&exercises, &filter);
    if matches.is_empty() {
        println!("No exercises match.");
        return Ok(());
    }

    for exercise in matches {
        let muscles = exercise.muscle_groups.join(", ");
        let equipment = exercise.equipment.join(", ");
        println!("{} [{}] ({})", exercise.name, muscles, equipment);
    }

    Ok(())
}

/// Run one immediate search over the cached library
fn search_exercises(
    exercises: Vec<Exercise>,
    term: &str,
    config: &Config,
) -> Result<Vec<Exercise>> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()?;

    runtime.block_on(async {
        let index = Arc::new(LocalExerciseIndex::new(exercises));
        let mut search = DebouncedSearch::new(index, &config.cache);
        let mut updates = search.subscribe();
        search.search_now(term);

        loop {
            match updates.borrow_and_update().clone() {
                SearchState::Ready { results, .. } => return Ok(results.as_ref().clone()),
                SearchState::Failed { message, .. } => return Err(Error::Other(message)),
                SearchState::Idle | SearchState::Loading { .. } => {}
            }
            if updates.changed().await.is_err() {
                return Err(Error::Other(format!("Search for {:?} was dropped", term)));
            }
        }
    })
}
