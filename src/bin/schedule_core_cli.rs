use std::{
    env, fs,
    path::{Path, PathBuf},
    process,
    sync::Arc,
};

use chrono::NaiveDate;

use schedule_core::{
    config::{Config, ConfigManager},
    currency::{format_currency_value, format_date, CurrencyCode, FormatOptions, LocaleConfig},
    init,
    schedule::{EvaluatorSettings, RecurrenceRule, ScheduleAction, ScheduleEvaluator},
    time::{Clock, FixedClock, SystemClock},
    utils::{build_info, persistence},
};

const DEFAULT_PREVIEW_COUNT: usize = 10;

fn main() {
    init();

    if let Err(err) = run() {
        eprintln!("Error: {err}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = env::args().skip(1);
    let command = args.next().unwrap_or_else(|| usage_exit());
    let config = load_config();

    match command.as_str() {
        "preview" => {
            let path = args.next().map(PathBuf::from).unwrap_or_else(|| usage_exit());
            let count = match args.next() {
                Some(raw) => raw.parse::<usize>()?,
                None => DEFAULT_PREVIEW_COUNT,
            };
            preview(&path, count, &config)?;
        }
        "due" => {
            let mut path = None;
            let mut reference = None;
            let mut apply = false;
            for arg in args {
                match arg.as_str() {
                    "--apply" => apply = true,
                    _ if path.is_none() => path = Some(PathBuf::from(arg)),
                    _ => reference = Some(NaiveDate::parse_from_str(&arg, "%Y-%m-%d")?),
                }
            }
            let path = path.unwrap_or_else(|| usage_exit());
            due(&path, reference, apply, &config)?;
        }
        "version" => {
            println!("{}", build_info::current().summary());
        }
        _ => usage_exit(),
    }

    Ok(())
}

fn load_config() -> Config {
    match ConfigManager::from_default_location().and_then(|manager| manager.load()) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(error = %err, "falling back to default configuration");
            Config::default()
        }
    }
}

fn preview(path: &Path, count: usize, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let data = fs::read_to_string(path)?;
    let rule: RecurrenceRule = serde_json::from_str(&data)?;
    println!("{}", rule);
    for (idx, date) in rule.occurrences().take(count).enumerate() {
        let mut line = format!(
            "{:>4}. {} {}",
            idx + 1,
            format_date(config.date_format, date),
            rule.time().format("%H:%M")
        );
        if let Some(remind_on) = rule.reminder_date(date) {
            line.push_str(&format!(
                "  (reminder {})",
                format_date(config.date_format, remind_on)
            ));
        }
        println!("{}", line);
    }
    if let Some(total) = rule.total_occurrences() {
        println!("{} occurrence(s) in total", total);
    }
    Ok(())
}

fn due(
    path: &Path,
    reference: Option<NaiveDate>,
    apply: bool,
    config: &Config,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut book = persistence::load_book_from_file(path)?;
    let clock: Arc<dyn Clock> = match reference {
        Some(date) => Arc::new(FixedClock::on(date)),
        None => Arc::new(SystemClock),
    };
    let evaluator = ScheduleEvaluator::new(clock, EvaluatorSettings::from(config));
    let actions = if apply {
        evaluator.run(&mut book.schedules)?
    } else {
        evaluator.evaluate(&book.schedules)
    };

    let locale = LocaleConfig {
        date_format: config.date_format,
        ..LocaleConfig::from_tag(&config.locale)
    };
    for action in &actions {
        let Some(schedule) = book
            .schedules
            .iter()
            .find(|s| s.id == action.schedule_id())
        else {
            continue;
        };
        let code = CurrencyCode::new(
            schedule
                .currency
                .clone()
                .unwrap_or_else(|| config.currency.clone()),
        );
        let amount =
            format_currency_value(schedule.amount, &code, &locale, &FormatOptions::default());
        match action {
            ScheduleAction::Materialize { ordinal, date, .. } => println!(
                "due      {}  #{:<4} {} {}",
                format_date(locale.date_format, *date),
                ordinal,
                schedule.name,
                amount
            ),
            ScheduleAction::Remind {
                occurrence,
                remind_on,
                ..
            } => println!(
                "reminder {}  {} {} due {}",
                format_date(locale.date_format, *remind_on),
                schedule.name,
                amount,
                format_date(locale.date_format, *occurrence)
            ),
        }
    }

    if apply {
        persistence::save_book_to_file(&book, path)?;
        println!("Updated {}", path.display());
    }
    Ok(())
}

fn usage_exit() -> ! {
    eprintln!(
        "Usage: schedule_core_cli <command>\n\
         Commands:\n  \
         preview <rule.json> [count]\n  \
         due <book.json> [YYYY-MM-DD] [--apply]\n  \
         version"
    );
    process::exit(1);
}
