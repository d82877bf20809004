use std::io::{self, BufRead, Write};

use quiz_core::enrich::{Explanation, SegmentKind};
use quiz_core::model::{SessionPhase, SessionSnapshot};
use services::QuizSessionController;

const BAR_WIDTH: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    Finished { percentage: u8 },
    Quit,
}

/// Drives one quiz over line-oriented input, redrawing after each intent.
///
/// # Errors
///
/// Returns an error if reading input or writing output fails, or if the
/// controller rejects an intent this loop should never send.
pub fn run_quiz<R: BufRead, W: Write>(
    controller: &mut QuizSessionController,
    input: &mut R,
    out: &mut W,
) -> Result<RunOutcome, Box<dyn std::error::Error>> {
    let mut last_percentage = None;

    loop {
        if controller.phase() == SessionPhase::Completed {
            let percentage = controller.final_score_percentage()?;
            render_completion(controller, out)?;
            last_percentage = Some(percentage);

            write!(out, "Tentar novamente? (s/N) ")?;
            out.flush()?;
            match read_line(input)? {
                Some(line) if line.eq_ignore_ascii_case("s") => {
                    controller.restart();
                    continue;
                }
                _ => return Ok(RunOutcome::Finished { percentage }),
            }
        }

        render_question(controller, out)?;
        let Some(line) = read_line(input)? else {
            return Ok(quit_outcome(last_percentage));
        };
        if line.eq_ignore_ascii_case("q") {
            return Ok(quit_outcome(last_percentage));
        }

        let Some(choice) = line.parse::<usize>().ok().and_then(|n| n.checked_sub(1)) else {
            writeln!(out, "Digite o número de uma alternativa (ou q para sair).")?;
            continue;
        };
        match controller.select_option(choice) {
            Ok(_) => {}
            Err(err) if !err.is_invalid_transition() => {
                writeln!(out, "Alternativa inválida: {err}")?;
                continue;
            }
            Err(err) => return Err(err.into()),
        }

        controller.check_answer()?;
        if let Some(explanation) = controller.explanation() {
            render_explanation(&explanation, out)?;
        }

        write!(out, "Pressione Enter para continuar...")?;
        out.flush()?;
        // Any line, or end of input, moves on.
        read_line(input)?;
        controller.next_question()?;
    }
}

fn quit_outcome(last_percentage: Option<u8>) -> RunOutcome {
    last_percentage.map_or(RunOutcome::Quit, |percentage| RunOutcome::Finished { percentage })
}

fn read_line<R: BufRead>(input: &mut R) -> io::Result<Option<String>> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

#[must_use]
pub fn progress_bar(snapshot: &SessionSnapshot) -> String {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let filled = (snapshot.progress_fraction * BAR_WIDTH as f64).round() as usize;
    let filled = filled.min(BAR_WIDTH);
    format!(
        "[{}{}] {}",
        "#".repeat(filled),
        "-".repeat(BAR_WIDTH - filled),
        snapshot.position_label()
    )
}

fn render_question<W: Write>(controller: &QuizSessionController, out: &mut W) -> io::Result<()> {
    let question = controller.current_question();
    writeln!(out)?;
    writeln!(out, "{}", progress_bar(&controller.snapshot()))?;
    writeln!(out, "{}", question.prompt())?;
    for (i, option) in question.options().iter().enumerate() {
        writeln!(out, "  {}) {option}", i + 1)?;
    }
    write!(out, "> ")?;
    out.flush()
}

fn render_explanation<W: Write>(explanation: &Explanation, out: &mut W) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", explanation.verdict().label())?;
    for segment in explanation.segments() {
        writeln!(out)?;
        match segment.kind {
            SegmentKind::Code => {
                writeln!(out, "```c")?;
                writeln!(out, "{}", segment.content)?;
                writeln!(out, "```")?;
            }
            SegmentKind::Comparison => writeln!(out, "| {}", segment.content)?,
            SegmentKind::Text | SegmentKind::Tip => writeln!(out, "{}", segment.content)?,
        }
    }
    writeln!(out)
}

fn render_completion<W: Write>(controller: &QuizSessionController, out: &mut W) -> io::Result<()> {
    let snapshot = controller.snapshot();
    writeln!(out)?;
    writeln!(out, "Quiz concluído!")?;
    writeln!(out, "Acertos: {} de {}", snapshot.score, snapshot.total)?;
    if let Ok(percentage) = controller.final_score_percentage() {
        writeln!(out, "Aproveitamento: {percentage}%")?;
    }
    if let Some(summary) = controller.summary() {
        let missed = summary.missed_questions();
        if !missed.is_empty() {
            let labels: Vec<String> = missed.iter().map(|i| (i + 1).to_string()).collect();
            writeln!(out, "Revise as questões: {}", labels.join(", "))?;
        }
    }
    Ok(())
}
