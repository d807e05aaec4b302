//! The interactive spin: build the eligible pool, animate rounds in the
//! terminal, and read confirm/reject decisions from stdin.

use std::io::Write;

use eatwhat_core::{Candidate, CandidateFilter, EligiblePool, LocationFix};
use eatwhat_db::PgCandidateStore;
use eatwhat_wheel::{
    slice_under_pointer, AnimationScheduler, Confirmation, Frame, FrameSink, RejectResult,
    SelectionEngine, Wheel,
};
use rand::{Rng, SeedableRng};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::acquire::prepare_fix_area;
use crate::context::AppContext;

/// Where the spin pool comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub(crate) enum PoolSource {
    /// The snapshot written by `fetch`.
    Cache,
    /// Every candidate stored in the database.
    Db,
}

/// Draws the slice under the pointer on one terminal line.
pub(crate) struct TerminalSink {
    names: Vec<String>,
    last_index: Option<usize>,
    enabled: bool,
}

impl TerminalSink {
    pub(crate) fn new(pool: &[&Candidate], enabled: bool) -> Self {
        Self {
            names: pool.iter().map(|c| c.name.clone()).collect(),
            last_index: None,
            enabled,
        }
    }
}

impl FrameSink for TerminalSink {
    fn render(&mut self, frame: Frame) {
        if !self.enabled {
            return;
        }
        let Some(index) = slice_under_pointer(frame.angle_deg, self.names.len()) else {
            return;
        };
        let mut err = std::io::stderr().lock();
        if frame.transitioning && self.last_index != Some(index) {
            self.last_index = Some(index);
            let _ = write!(err, "\r\x1b[2K  > {}", self.names[index]);
            let _ = err.flush();
        } else if !frame.transitioning {
            let _ = writeln!(err, "\r\x1b[2K  > {}", self.names[index]);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Decision {
    Confirm,
    Reject,
    Quit,
}

fn parse_decision(line: &str) -> Option<Decision> {
    match line.trim().to_lowercase().as_str() {
        "y" | "yes" => Some(Decision::Confirm),
        "n" | "no" => Some(Decision::Reject),
        "q" | "quit" => Some(Decision::Quit),
        _ => None,
    }
}

async fn read_decision<I, W>(input: &mut I, out: &mut W) -> anyhow::Result<Decision>
where
    I: AsyncBufRead + Unpin,
    W: Write,
{
    loop {
        write!(out, "Go here? [y]es / [n]o, spin again / [q]uit: ")?;
        out.flush()?;
        let mut line = String::new();
        if input.read_line(&mut line).await? == 0 {
            return Ok(Decision::Quit);
        }
        if let Some(decision) = parse_decision(&line) {
            return Ok(decision);
        }
    }
}

fn print_card<W: Write>(out: &mut W, candidate: &Candidate, remaining: usize) -> std::io::Result<()> {
    writeln!(out)?;
    writeln!(out, "  {}", candidate.name)?;
    writeln!(
        out,
        "  {} stars | {} | {}",
        candidate.rating,
        candidate.price_label,
        candidate.distance_label()
    )?;
    writeln!(out, "  {}", candidate.address)?;
    if !candidate.tags.is_empty() {
        writeln!(out, "  {}", candidate.tags.join(" / "))?;
    }
    writeln!(out, "  ({remaining} options in this round)")
}

/// Runs rounds until the user confirms or quits.
///
/// Returns the confirmation, or `None` when the user quits or input ends.
///
/// # Errors
///
/// Returns an error if the pool is empty, a round is cancelled, or the
/// terminal cannot be written.
pub(crate) async fn run_session<R, I, W>(
    wheel: &mut Wheel,
    rng: &mut R,
    input: &mut I,
    out: &mut W,
    animate: bool,
) -> anyhow::Result<Option<Confirmation>>
where
    R: Rng,
    I: AsyncBufRead + Unpin,
    W: Write,
{
    let sink = |wheel: &Wheel| TerminalSink::new(&wheel.engine().eligible(), animate);

    let mut round_size = wheel.engine().remaining();
    let first = sink(&*wheel);
    let mut chosen = wheel.spin_round(rng, first).await?;
    loop {
        print_card(out, &chosen, round_size)?;
        match read_decision(input, out).await? {
            Decision::Confirm => return Ok(Some(wheel.confirm()?)),
            Decision::Quit => return Ok(None),
            Decision::Reject => {
                round_size = wheel.engine().remaining().saturating_sub(1);
                // the respin draws from the pool minus the rejected candidate
                let next_sink = {
                    let chosen_id = chosen.id;
                    let pool: Vec<&Candidate> = wheel
                        .engine()
                        .eligible()
                        .into_iter()
                        .filter(|c| c.id != chosen_id)
                        .collect();
                    TerminalSink::new(&pool, animate)
                };
                match wheel.reject(rng, next_sink).await? {
                    RejectResult::Chosen(next) => chosen = next,
                    RejectResult::Restored { pool_size } => {
                        writeln!(
                            out,
                            "Only one option was left, so all {pool_size} are back. Press Enter to spin again or q to quit."
                        )?;
                        let mut line = String::new();
                        if input.read_line(&mut line).await? == 0
                            || parse_decision(&line) == Some(Decision::Quit)
                        {
                            return Ok(None);
                        }
                        round_size = wheel.engine().remaining();
                        let again = sink(&*wheel);
                        chosen = wheel.spin_round(rng, again).await?;
                    }
                }
            }
        }
    }
}

/// Builds the eligible pool from the chosen source. The database source
/// seeds the last known area first when it is still empty.
async fn load_pool(
    ctx: &AppContext,
    source: PoolSource,
    filter: &CandidateFilter,
) -> anyhow::Result<(EligiblePool, Option<LocationFix>)> {
    let (candidates, fix) = match source {
        PoolSource::Cache => match ctx.load_cache()? {
            Some(cache) => (cache.candidates, cache.fix),
            None => anyhow::bail!(
                "no snapshot at {}; run `eatwhat fetch` first or use --source db",
                ctx.config.cache_path.display()
            ),
        },
        PoolSource::Db => {
            let pool = ctx.pool().await?;
            let fix = ctx.load_cache()?.and_then(|cache| cache.fix);
            if let Some(fix) = &fix {
                let store = PgCandidateStore::new(pool.clone());
                let mut rng = rand::rngs::StdRng::from_os_rng();
                prepare_fix_area(&store, fix, &mut rng).await?;
            }
            (eatwhat_db::list_candidates(&pool).await?, fix)
        }
    };
    let annotated = ctx.pool_builder().build(candidates, fix.as_ref(), filter);
    Ok((annotated.eligible(), fix))
}

/// The `spin` command.
///
/// # Errors
///
/// Returns an error if the pool cannot be loaded, a history write fails, or
/// the terminal cannot be read.
pub(crate) async fn run_spin(
    ctx: &AppContext,
    source: PoolSource,
    filter: CandidateFilter,
    animate: bool,
) -> anyhow::Result<()> {
    let (eligible, fix) = load_pool(ctx, source, &filter).await?;
    if let Some(fix) = &fix {
        println!("Around {} ({})", fix.label, fix.source);
    }
    if let Some(notice) = eligible.notice {
        println!("{notice}");
    }
    if eligible.is_empty() {
        println!("nothing to spin: no restaurants match; fetch, sync or relax the filters");
        return Ok(());
    }

    let mut wheel = Wheel::new(
        SelectionEngine::new(eligible.candidates),
        AnimationScheduler::default(),
    );
    let mut rng = rand::rngs::StdRng::from_os_rng();
    let mut input = tokio::io::BufReader::new(tokio::io::stdin());
    let mut out = std::io::stdout();

    let Some(confirmation) =
        run_session(&mut wheel, &mut rng, &mut input, &mut out, animate).await?
    else {
        println!("no decision made");
        return Ok(());
    };

    println!("Enjoy {}!", confirmation.candidate.name);
    if source == PoolSource::Db {
        let pool = ctx.pool().await?;
        let entry = eatwhat_db::NewHistoryEntry {
            user_key: &ctx.config.user_key,
            candidate_id: confirmation.candidate.id,
            session_id: Some(confirmation.session_id),
            rejected_count: i32::try_from(confirmation.rejected).unwrap_or(i32::MAX),
        };
        eatwhat_db::add_history(&pool, &entry).await?;
        tracing::info!(candidate_id = entry.candidate_id, "history recorded");
    }
    Ok(())
}

#[cfg(test)]
#[path = "spin_test.rs"]
mod tests;
