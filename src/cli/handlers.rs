use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::Serialize;

use crate::{
    cli::{
        output,
        parse_reference,
        table::{Table, TableColumn},
        Cli, Command, ConfigCommand,
    },
    config::{Config, ConfigManager},
    core::{
        build_info,
        clock::{Clock, FixedClock, SystemClock},
        errors::{CliError, ControlError},
        services::{CardService, ProgressService, SummaryService},
        utils::PathResolver,
    },
    currency::{format_currency_value, format_date, format_percent, FormatOptions},
    domain::{period::parse_timezone, CategoryTree, ControlProgress, ReportRange, Snapshot},
    storage::{JsonSnapshotStore, SnapshotStore},
};

/// Loaded inputs shared by the read-only commands.
struct Session {
    config: Config,
    snapshot: Snapshot,
    categories: CategoryTree,
    reference: DateTime<Utc>,
    json: bool,
}

impl Session {
    fn money(&self, amount: f64) -> String {
        format_currency_value(
            amount,
            &self.config.currency_code(),
            &self.config.locale_config(),
            &FormatOptions::default(),
        )
    }

    fn percent(&self, pct: f64) -> String {
        format_percent(&self.config.locale_config(), pct)
    }

    fn timezone(&self) -> Result<Tz, CliError> {
        Ok(parse_timezone(self.config.timezone.as_deref())?)
    }

    fn scope_label(&self, category_id: Option<&str>) -> String {
        match category_id {
            Some(id) => self.categories.name_of(id).unwrap_or(id).to_string(),
            None => "All expenses".to_string(),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EvaluationView {
    control_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    progress: Option<ControlProgress>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

pub fn run(cli: Cli) -> Result<(), CliError> {
    if cli.no_color {
        colored::control::set_override(false);
    }
    let base = PathResolver::resolve_base(cli.home.clone());
    let manager = ConfigManager::with_base_dir(base)?;

    match &cli.command {
        Command::Version => {
            output::info(build_info::current().summary());
            return Ok(());
        }
        Command::Config(args) => return config_command(&manager, &args.command, cli.json),
        _ => {}
    }

    let config = manager.load()?;
    let clock: Box<dyn Clock> = match cli.date.as_deref() {
        Some(raw) => Box::new(FixedClock(parse_reference(raw)?)),
        None => Box::new(SystemClock),
    };
    let reference = clock.now();
    let store = match cli.snapshot.clone() {
        Some(path) => JsonSnapshotStore::new(path),
        None => JsonSnapshotStore::in_base(cli.home.clone()),
    };
    let mut snapshot = store.load()?;
    apply_default_timezone(&mut snapshot, config.timezone.as_deref());
    tracing::debug!(
        snapshot = %store.path().display(),
        reference = %reference,
        "running command"
    );

    let session = Session {
        categories: snapshot.category_tree(),
        config,
        snapshot,
        reference,
        json: cli.json,
    };

    match cli.command {
        Command::Progress(args) => match args.control {
            Some(id) => progress_one(&session, &id),
            None => progress_all(&session),
        },
        Command::AtRisk(args) => at_risk(&session, args.top),
        Command::Finance(args) => finance(&session, args.report_range()?),
        Command::Payments(args) => payments(&session, args.report_range()?),
        Command::Categories(args) => categories(&session, args.report_range()?),
        Command::Income(args) => income(&session, args.report_range()?),
        Command::Card(args) => card(&session, &args.card_id),
        Command::Version | Command::Config(_) => Ok(()),
    }
}

/// Controls and cards without their own zone follow the configured one.
fn apply_default_timezone(snapshot: &mut Snapshot, timezone: Option<&str>) {
    let Some(timezone) = timezone else {
        return;
    };
    for control in &mut snapshot.controls {
        control.timezone.get_or_insert_with(|| timezone.to_string());
    }
    for card in &mut snapshot.cards {
        card.timezone.get_or_insert_with(|| timezone.to_string());
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn evaluate(session: &Session) -> Vec<EvaluationView> {
    ProgressService::compute_all(
        &session.snapshot.controls,
        &session.snapshot.transactions,
        Some(&session.categories),
        session.reference,
        &session.config.thresholds,
    )
    .into_iter()
    .map(|evaluation| match evaluation.result {
        Ok(progress) => EvaluationView {
            control_id: evaluation.control_id,
            progress: Some(progress),
            error: None,
        },
        Err(err) => EvaluationView {
            control_id: evaluation.control_id,
            progress: None,
            error: Some(err.to_string()),
        },
    })
    .collect()
}

fn progress_all(session: &Session) -> Result<(), CliError> {
    let evaluations = evaluate(session);
    if session.json {
        return print_json(&evaluations);
    }
    if evaluations.is_empty() {
        output::info("No active spending controls.");
        return Ok(());
    }

    let mut table = Table::new(vec![
        TableColumn::left("Control"),
        TableColumn::left("Period"),
        TableColumn::right("Spent"),
        TableColumn::right("Goal"),
        TableColumn::right("Limit"),
        TableColumn::right("Used"),
        TableColumn::left("Status"),
        TableColumn::left(""),
    ]);
    let mut failures = Vec::new();
    for evaluation in &evaluations {
        let Some(progress) = evaluation.progress.as_ref() else {
            failures.push(evaluation);
            continue;
        };
        table.push(vec![
            session.scope_label(progress.category_id.as_deref()),
            progress.period_type.to_string(),
            session.money(progress.spent),
            session.money(progress.effective_goal),
            progress
                .limit
                .map(|limit| session.money(limit))
                .unwrap_or_else(|| "-".into()),
            session.percent(progress.classification_pct()),
            output::status_label(progress.status),
            output::progress_bar(progress.bar_pct(), progress.status),
        ]);
    }
    output::section("Spending controls");
    output::info(table.render());
    for failed in failures {
        output::warning(format!(
            "control {} could not be evaluated: {}",
            failed.control_id,
            failed.error.as_deref().unwrap_or("unknown error")
        ));
    }
    Ok(())
}

fn progress_one(session: &Session, control_id: &str) -> Result<(), CliError> {
    let control = session
        .snapshot
        .control(control_id)
        .ok_or_else(|| ControlError::ControlNotFound(control_id.to_string()))?;
    let progress = ProgressService::compute(
        control,
        &session.snapshot.transactions,
        Some(&session.categories),
        session.reference,
        &session.config.thresholds,
    )?;
    if session.json {
        return print_json(&progress);
    }

    let locale = session.config.locale_config();
    output::section(format!(
        "{} ({})",
        session.scope_label(progress.category_id.as_deref()),
        progress.period_type
    ));
    output::info(format!(
        "Period      {} to {}",
        format_date(&locale, progress.period_start.date_naive()),
        format_date(&locale, progress.period_end.date_naive())
    ));
    output::info(format!("Spent       {}", session.money(progress.spent)));
    output::info(format!(
        "Goal        {} ({} used, {} left)",
        session.money(progress.effective_goal),
        session.percent(progress.usage_pct_of_goal),
        session.money(progress.remaining_to_goal)
    ));
    if progress.carried_over > 0.0 {
        output::info(format!(
            "Carried     {}",
            session.money(progress.carried_over)
        ));
    }
    if let (Some(limit), Some(pct), Some(left)) = (
        progress.limit,
        progress.usage_pct_of_limit,
        progress.remaining_to_limit,
    ) {
        output::info(format!(
            "Limit       {} ({} used, {} left)",
            session.money(limit),
            session.percent(pct),
            session.money(left)
        ));
    }
    output::info(format!(
        "Status      {} {}",
        output::status_label(progress.status),
        output::progress_bar(progress.bar_pct(), progress.status)
    ));
    output::info(format!(
        "Projection  {} by {} (day {} of {}, {}/day)",
        session.money(progress.projection.projected),
        format_date(&locale, progress.period_end.date_naive()),
        progress.projection.elapsed_days,
        progress.projection.total_days,
        session.money(progress.projection.daily_avg)
    ));
    if progress.projected_over_limit() {
        output::warning("Projected spend exceeds the limit.");
    } else if progress.projected_over_goal() {
        output::warning("Projected spend exceeds the goal.");
    }
    if !progress.crossed_thresholds.is_empty() {
        let crossed: Vec<String> = progress
            .crossed_thresholds
            .iter()
            .map(|pct| session.percent(*pct))
            .collect();
        output::info(format!("Alerts      {}", crossed.join(", ")));
    }
    if progress.skipped_transactions > 0 {
        output::warning(format!(
            "{} malformed transaction(s) ignored",
            progress.skipped_transactions
        ));
    }
    if progress.breakdown.len() > 1 {
        let mut table = Table::new(vec![
            TableColumn::left("Category"),
            TableColumn::right("Spent"),
            TableColumn::right("Count"),
        ]);
        for entry in &progress.breakdown {
            table.push(vec![
                session.scope_label(entry.category_id.as_deref()),
                session.money(entry.total),
                entry.count.to_string(),
            ]);
        }
        output::info(table.render());
    }
    Ok(())
}

fn at_risk(session: &Session, top: Option<usize>) -> Result<(), CliError> {
    let top_n = top.unwrap_or(session.config.top_n);
    let evaluations = evaluate(session);
    let computed: Vec<ControlProgress> = evaluations
        .into_iter()
        .filter_map(|evaluation| evaluation.progress)
        .collect();
    let ranked = ProgressService::rank_at_risk(&computed, top_n);
    if session.json {
        return print_json(&ranked);
    }
    if ranked.is_empty() {
        output::success("No controls to rank.");
        return Ok(());
    }

    let mut table = Table::new(vec![
        TableColumn::right("#"),
        TableColumn::left("Control"),
        TableColumn::left("Status"),
        TableColumn::right("Used"),
        TableColumn::right("Spent"),
        TableColumn::right("Projected"),
    ]);
    for (idx, progress) in ranked.iter().enumerate() {
        table.push(vec![
            (idx + 1).to_string(),
            session.scope_label(progress.category_id.as_deref()),
            output::status_label(progress.status),
            session.percent(progress.classification_pct()),
            session.money(progress.spent),
            session.money(progress.projection.projected),
        ]);
    }
    output::section("Controls at risk");
    output::info(table.render());
    Ok(())
}

fn finance(session: &Session, range: ReportRange) -> Result<(), CliError> {
    let status = SummaryService::finance_status(
        &session.snapshot.transactions,
        range,
        session.reference,
        &session.timezone()?,
    )?;
    if session.json {
        return print_json(&status);
    }
    let period = &status.period;
    output::section("Finance status");
    output::info(format!(
        "Income      {} {}",
        session.money(period.income),
        output::change_label(period.income_change, false)
    ));
    output::info(format!(
        "Expense     {} {}",
        session.money(period.expense),
        output::change_label(period.expense_change, true)
    ));
    output::info(format!(
        "Balance     {} {}",
        session.money(period.balance),
        output::change_label(period.balance_change, false)
    ));
    output::info(format!(
        "All time    {} in, {} out, {} balance",
        session.money(status.accumulated.total_income),
        session.money(status.accumulated.total_expense),
        session.money(status.accumulated.total_balance)
    ));
    Ok(())
}

fn payments(session: &Session, range: ReportRange) -> Result<(), CliError> {
    let summary = SummaryService::payment_summary(
        &session.snapshot.transactions,
        range,
        session.reference,
        &session.timezone()?,
    )?;
    if session.json {
        return print_json(&summary);
    }
    let mut table = Table::new(vec![
        TableColumn::left("Payment"),
        TableColumn::right("Total"),
        TableColumn::right("Count"),
        TableColumn::right("Average"),
        TableColumn::right("Share"),
        TableColumn::right("Change"),
    ]);
    for bucket in &summary.buckets {
        table.push(vec![
            bucket.payment_type.to_string(),
            session.money(bucket.total),
            bucket.count.to_string(),
            session.money(bucket.avg),
            session.percent(bucket.share_pct),
            output::change_label(bucket.delta_pct, true),
        ]);
    }
    output::section(format!("Payments ({} total)", session.money(summary.total)));
    output::info(table.render());
    Ok(())
}

fn categories(session: &Session, range: ReportRange) -> Result<(), CliError> {
    let (current, _) =
        SummaryService::resolve_range(range, session.reference, &session.timezone()?)?;
    let shares = SummaryService::category_distribution(
        &session.snapshot.transactions,
        &session.categories,
        &current,
    );
    if session.json {
        return print_json(&shares);
    }
    if shares.is_empty() {
        output::info("No expenses in range.");
        return Ok(());
    }
    let mut table = Table::new(vec![
        TableColumn::left("Category"),
        TableColumn::right("Total"),
        TableColumn::right("Share"),
    ]);
    for share in &shares {
        table.push(vec![
            share.name.clone(),
            session.money(share.total),
            session.percent(share.share_pct),
        ]);
    }
    output::section("Expenses by category");
    output::info(table.render());
    Ok(())
}

fn income(session: &Session, range: ReportRange) -> Result<(), CliError> {
    let (current, _) =
        SummaryService::resolve_range(range, session.reference, &session.timezone()?)?;
    let sources = SummaryService::income_by_source(&session.snapshot.transactions, &current);
    if session.json {
        return print_json(&sources);
    }
    if sources.is_empty() {
        output::info("No income in range.");
        return Ok(());
    }
    let mut table = Table::new(vec![
        TableColumn::left("Source"),
        TableColumn::right("Entries"),
        TableColumn::right("Total"),
        TableColumn::right("Share"),
    ]);
    for source in &sources {
        table.push(vec![
            source.source.clone(),
            source.count.to_string(),
            session.money(source.total),
            session.percent(source.share_pct),
        ]);
    }
    output::section("Income by source");
    output::info(table.render());
    Ok(())
}

fn card(session: &Session, card_id: &str) -> Result<(), CliError> {
    let summary = CardService::summarize_by_id(
        &session.snapshot.cards,
        card_id,
        &session.snapshot.transactions,
        session.reference,
    )?;
    if session.json {
        return print_json(&summary);
    }
    let locale = session.config.locale_config();
    let metrics = &summary.metrics;
    output::section(&summary.name);
    output::info(format!(
        "Cycle       {} to {} (closes {}, due {})",
        format_date(&locale, summary.cycle.start.date_naive()),
        format_date(&locale, summary.cycle.end.date_naive()),
        format_date(&locale, summary.cycle.closing_date),
        format_date(&locale, summary.cycle.due_date)
    ));
    output::info(format!(
        "Spent       {} of {} ({})",
        session.money(metrics.spent),
        session.money(summary.limit),
        session.percent(metrics.util_pct)
    ));
    output::info(format!("Available   {}", session.money(metrics.remaining)));
    output::info(format!(
        "Projection  {} ({}/day)",
        session.money(metrics.projected),
        session.money(metrics.daily_avg)
    ));
    if metrics.over_limit {
        output::error("Card limit exceeded.");
    }
    for entry in &summary.top_categories {
        output::info(format!(
            "  {:<20} {}",
            session.scope_label(entry.category_id.as_deref()),
            session.money(entry.total)
        ));
    }
    Ok(())
}

fn config_command(
    manager: &ConfigManager,
    command: &ConfigCommand,
    json: bool,
) -> Result<(), CliError> {
    match command {
        ConfigCommand::Path => output::info(manager.path().display()),
        ConfigCommand::Show => {
            let config = manager.load()?;
            if json {
                return print_json(&config);
            }
            output::section("Configuration");
            output::info(format!("locale       {}", config.locale));
            output::info(format!("currency     {}", config.currency));
            output::info(format!(
                "timezone     {}",
                config.timezone.as_deref().unwrap_or("UTC")
            ));
            output::info(format!("warning_pct  {}", config.thresholds.warning_pct));
            output::info(format!("danger_pct   {}", config.thresholds.danger_pct));
            output::info(format!("top_n        {}", config.top_n));
        }
        ConfigCommand::Set { key, value } => {
            let mut config = manager.load()?;
            config.set(key, value)?;
            manager.save(&config)?;
            output::success(format!("{key} set to {value}"));
        }
    }
    Ok(())
}
