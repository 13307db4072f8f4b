//! Command handlers. Each one opens the ledger, runs against the stores, and
//! saves the ledger back when it changed anything.

use anyhow::{Context, Result, bail};
use chrono::{DateTime, Local, NaiveDate, TimeZone, Utc};
use finwise_core::{
    ActionItem, ActionItemStore, Category, NewTransaction, ProfileStore, ProgressDisplay, Session,
    TransactionStore, TransactionUpdate,
};
use finwise_finance::action_items::format_amount;
use finwise_finance::{
    FinancialContext, HealthLabel, StreamEvent, monthly_trend, propose_import, score_answers,
    spending_by_category, system_prompt,
};
use finwise_ingest::ColumnMapping;
use std::io::Write;
use std::path::Path;

use crate::config::{self, Config};
use crate::llm_stream;
use crate::state::{self, Ledger};

fn session(cfg: &Config) -> Session {
    Session::from_id(&cfg.user.id)
}

fn open_ledger() -> Result<Ledger> {
    Ledger::open(state::ledger_path()?)
}

/// One reading of the clock: the user's calendar day and the matching instant
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Clock {
    pub today: NaiveDate,
    pub now: DateTime<Utc>,
}

impl Clock {
    pub fn now() -> Self {
        Self::at(Local::now())
    }

    pub fn at<Tz: TimeZone>(instant: DateTime<Tz>) -> Self {
        Self {
            today: instant.date_naive(),
            now: instant.with_timezone(&Utc),
        }
    }
}

/// Recompute the profile and regenerate action items after a ledger change
async fn refresh(ledger: &Ledger, session: &Session) -> Result<()> {
    let user = session.user_id()?;
    let txns = ledger.store.list_transactions(user).await?;
    let clock = Clock::now();
    let profile =
        finwise_finance::recompute_as_of(session, &ledger.store, &txns, clock.today, clock.now)
            .await?;
    finwise_finance::regenerate(session, &ledger.store, &profile).await?;
    println!(
        "Health {}/100 ({}), savings rate {}%",
        profile.overall_health_score,
        HealthLabel::from_score(profile.overall_health_score).as_str(),
        profile.savings_rate
    );
    Ok(())
}

pub fn show_config() -> Result<()> {
    let path = config::config_path()?;
    let cfg = config::load_config()?;
    println!("# {}", path.display());
    print!("{}", toml::to_string_pretty(&cfg).context("serialize config")?);
    Ok(())
}

pub async fn import(
    cfg: &Config,
    csv: &Path,
    mapping: &ColumnMapping,
    overrides: &[(usize, Category)],
    commit: bool,
) -> Result<()> {
    if !csv.exists() {
        bail!("CSV not found: {}", csv.display());
    }
    let text = std::fs::read_to_string(csv).with_context(|| format!("read {}", csv.display()))?;
    let mut proposal =
        propose_import(&text, mapping).with_context(|| format!("parsing {}", csv.display()))?;

    for (index, category) in overrides {
        proposal.set_category(*index, *category)?;
    }

    println!("Parsed {} rows from {}", proposal.rows.len(), csv.display());
    if proposal.dropped > 0 {
        println!("Skipped {} rows without a usable amount", proposal.dropped);
    }
    println!();
    for (i, row) in proposal.rows.iter().enumerate() {
        println!(
            "{:>4}  {:<12} {:<40} {:>10.2}  {:<7} {}",
            i + 1,
            row.date,
            truncate(&row.description, 40),
            row.amount,
            row.transaction_type,
            row.category
        );
    }
    println!(
        "\nIncome ${:.2}  Expenses ${:.2}",
        proposal.total_income(),
        proposal.total_expenses()
    );

    if !commit {
        println!("Preview only. Re-run with --commit to save.");
        return Ok(());
    }

    let session = session(cfg);
    let ledger = open_ledger()?;
    let today = Clock::now().today;
    let stored = finwise_finance::commit_import(&session, &ledger.store, &proposal.rows, today).await?;
    println!("Saved {} transactions", stored.len());
    refresh(&ledger, &session).await?;
    ledger.save().await
}

pub async fn add(cfg: &Config, txn: NewTransaction) -> Result<()> {
    let session = session(cfg);
    let user = session.user_id()?;
    let ledger = open_ledger()?;
    let stored = ledger.store.insert_transaction(user, txn).await?;
    println!("Added {}", stored.id);
    refresh(&ledger, &session).await?;
    ledger.save().await
}

pub async fn list(cfg: &Config, limit: usize) -> Result<()> {
    let session = session(cfg);
    let ledger = open_ledger()?;
    let txns = ledger.store.list_transactions(session.user_id()?).await?;
    if txns.is_empty() {
        println!("No transactions yet. Try: finwise import <csv>");
        return Ok(());
    }
    for t in txns.iter().take(limit) {
        let sign = if t.is_income() { "+" } else { "-" };
        println!(
            "{}  {}  {:<40} {}{:>10.2}  {}{}",
            t.id,
            t.transaction_date,
            truncate(&t.description, 40),
            sign,
            t.amount,
            t.category.label(),
            if t.is_recurring { " (recurring)" } else { "" }
        );
    }
    if txns.len() > limit {
        println!("... {} more", txns.len() - limit);
    }
    Ok(())
}

pub async fn edit(cfg: &Config, id: &str, update: TransactionUpdate) -> Result<()> {
    if update.is_empty() {
        bail!("nothing to change; pass at least one field");
    }
    let session = session(cfg);
    let user = session.user_id()?;
    let ledger = open_ledger()?;
    let t = ledger.store.update_transaction(user, id, update).await?;
    println!("Updated {} ({} {:.2} {})", t.id, t.transaction_type, t.amount, t.category);
    refresh(&ledger, &session).await?;
    ledger.save().await
}

pub async fn delete(cfg: &Config, id: &str) -> Result<()> {
    let session = session(cfg);
    let user = session.user_id()?;
    let ledger = open_ledger()?;
    ledger.store.delete_transaction(user, id).await?;
    println!("Deleted {id}");
    refresh(&ledger, &session).await?;
    ledger.save().await
}

pub async fn score(cfg: &Config, as_of: Option<NaiveDate>) -> Result<()> {
    let session = session(cfg);
    let user = session.user_id()?;
    let ledger = open_ledger()?;
    let txns = ledger.store.list_transactions(user).await?;

    let scores = match as_of {
        Some(date) => {
            println!("Scores as of {date} (not saved)\n");
            finwise_finance::score(&txns, date)
        }
        None => {
            let clock = Clock::now();
            let profile = finwise_finance::recompute_as_of(
                &session,
                &ledger.store,
                &txns,
                clock.today,
                clock.now,
            )
            .await?;
            finwise_finance::regenerate(&session, &ledger.store, &profile).await?;
            ledger.save().await?;
            profile.scores()
        }
    };

    println!(
        "Overall health       {:>3}/100  {}",
        scores.overall_health_score,
        HealthLabel::from_score(scores.overall_health_score).as_str()
    );
    println!("Spending discipline  {:>3}/100", scores.spending_discipline_score);
    println!("Financial stability  {:>3}/100", scores.financial_stability_score);
    println!("Investment readiness {:>3}/100", scores.investment_readiness_score);
    println!();
    println!("Income (3 months)    ${}", format_amount(scores.total_income));
    println!("Expenses (3 months)  ${}", format_amount(scores.total_expenses));
    println!("Savings rate         {}%", scores.savings_rate);
    println!("Monthly burn         ${}", format_amount(scores.monthly_burn_rate));
    println!(
        "Risk profile         {}: {}",
        scores.risk_level.title(),
        scores.risk_level.description()
    );
    Ok(())
}

fn print_action(item: &ActionItem) {
    let mark = if item.is_completed { "x" } else { " " };
    println!("[{mark}] P{} {}  ({})", item.priority, item.title, item.id);
    println!("       {}", item.description);
    match item.progress_display() {
        ProgressDisplay::None => {}
        ProgressDisplay::Percentage { current, target, percent } => {
            println!("       {current:.1}% of {target:.0}% ({percent:.0}%)");
        }
        ProgressDisplay::Currency { current, target, percent } => {
            println!(
                "       ${} of ${} ({percent:.0}%)",
                format_amount(current),
                format_amount(target)
            );
        }
    }
}

pub async fn list_actions(cfg: &Config) -> Result<()> {
    let session = session(cfg);
    let ledger = open_ledger()?;
    let items = ledger.store.list_action_items(session.user_id()?).await?;
    if items.is_empty() {
        println!("No action items. Run: finwise actions regenerate");
        return Ok(());
    }
    for item in &items {
        print_action(item);
    }
    Ok(())
}

pub async fn regenerate_actions(cfg: &Config) -> Result<()> {
    let session = session(cfg);
    let user = session.user_id()?;
    let ledger = open_ledger()?;
    let profile = ledger.store.get_or_create_profile(user).await?;
    let items = finwise_finance::regenerate(&session, &ledger.store, &profile).await?;
    for item in &items {
        print_action(item);
    }
    ledger.save().await
}

pub async fn toggle_action(cfg: &Config, id: &str) -> Result<()> {
    let session = session(cfg);
    let user = session.user_id()?;
    let ledger = open_ledger()?;
    let current = ledger
        .store
        .list_action_items(user)
        .await?
        .into_iter()
        .find(|i| i.id == id)
        .with_context(|| format!("no action item {id}"))?;
    let item =
        finwise_finance::set_completed(&session, &ledger.store, id, !current.is_completed).await?;
    print_action(&item);
    ledger.save().await
}

pub async fn quiz(cfg: &Config, answers: &[u8]) -> Result<()> {
    let level = score_answers(answers)?;
    let session = session(cfg);
    let ledger = open_ledger()?;
    let profile = finwise_finance::save_risk_level(&session, &ledger.store, level).await?;
    // the investing advice follows the risk level, so refresh the items without rescoring
    finwise_finance::regenerate(&session, &ledger.store, &profile).await?;
    ledger.save().await?;

    println!("Risk profile: {}", level.title());
    println!("{}", level.description());
    Ok(())
}

pub async fn insights(cfg: &Config, months: u32) -> Result<()> {
    let session = session(cfg);
    let user = session.user_id()?;
    let ledger = open_ledger()?;
    let profile = ledger.store.get_or_create_profile(user).await?;
    let txns = ledger.store.list_transactions(user).await?;

    if profile.last_calculated_at.is_none() {
        println!("Profile not scored yet. Run: finwise score\n");
    } else {
        println!(
            "Health {}/100 ({})\n",
            profile.overall_health_score,
            HealthLabel::from_score(profile.overall_health_score).as_str()
        );
    }

    println!("Spending by category");
    let spend = spending_by_category(&txns);
    if spend.is_empty() {
        println!("  (no expenses)");
    }
    for s in &spend {
        println!("  {:<20} ${:>12}", s.category.label(), format_amount(s.amount));
    }

    println!("\nMonthly trend");
    let today = Clock::now().today;
    for m in monthly_trend(&txns, today, months) {
        println!(
            "  {}  income ${:>10}  expenses ${:>10}  savings {}${}",
            m.month.format("%b %Y"),
            format_amount(m.income),
            format_amount(m.expenses),
            if m.savings < 0.0 { "-" } else { " " },
            format_amount(m.savings.abs())
        );
    }
    Ok(())
}

pub async fn chat(cfg: &Config, message: &str) -> Result<()> {
    let session = session(cfg);
    let context = match session.user_id() {
        Ok(user) => {
            let ledger = open_ledger()?;
            let profile = ledger.store.get_or_create_profile(user).await?;
            let txns = ledger.store.list_transactions(user).await?;
            Some(FinancialContext::build(Some(&profile), &txns))
        }
        // chat works without a user, just without personal context
        Err(_) => None,
    };
    let system = system_prompt(context.as_ref());

    let mut out = std::io::stdout();
    llm_stream::stream_chat(&cfg.llm, &system, message, |ev| match ev {
        StreamEvent::Delta(text) => {
            let _ = write!(out, "{text}");
            let _ = out.flush();
        }
        StreamEvent::Completed => {
            let _ = writeln!(out);
        }
    })
    .await?;
    Ok(())
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    #[test]
    fn test_truncate_counts_chars() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefghij", 5), "abcd…");
        assert_eq!(truncate("ééééé", 5), "ééééé");
    }

    #[test]
    fn test_clock_date_and_stamp_share_one_reading() {
        let east = FixedOffset::east_opt(10 * 3600).unwrap();
        let instant = Utc.with_ymd_and_hms(2026, 3, 31, 23, 30, 0).unwrap();
        let clock = Clock::at(instant.with_timezone(&east));
        assert_eq!(clock.today, NaiveDate::from_ymd_opt(2026, 4, 1).unwrap());
        assert_eq!(clock.now, instant);

        let utc = Clock::at(instant);
        assert_eq!(utc.today, NaiveDate::from_ymd_opt(2026, 3, 31).unwrap());
    }
}
