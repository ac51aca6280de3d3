//! Interactive 1-7 manual rating of generated jokes.

use crate::model::{JokeRecord, ManualRatings};
use std::io::{BufRead, Write};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Answer {
    Score(u8),
    Skip,
    Quit,
}

/// `1`-`7`, `s`/`skip`, `q`/`quit`. Anything else is rejected with a hint.
pub fn parse_answer(input: &str) -> Result<Answer, &'static str> {
    let s = input.trim().to_ascii_lowercase();
    match s.as_str() {
        "s" | "skip" => return Ok(Answer::Skip),
        "q" | "quit" => return Ok(Answer::Quit),
        _ => {}
    }
    match s.parse::<i64>() {
        Ok(n) if (1..=7).contains(&n) => Ok(Answer::Score(n as u8)),
        Ok(_) => Err("please enter a number between 1 and 7"),
        Err(_) => Err("please enter a valid number (or 's' to skip, 'q' to quit)"),
    }
}

/// Indices of jokes with a response and no funniness rating yet.
pub fn pending(jokes: &[JokeRecord]) -> Vec<usize> {
    jokes
        .iter()
        .enumerate()
        .filter(|(_, j)| j.succeeded() && !j.is_rated())
        .map(|(i, _)| i)
        .collect()
}

pub const DIMENSIONS: [&str; 4] = [
    "Funniness",
    "Category fit",
    "Structural coherence",
    "Originality",
];

pub struct RatingSession<R, W> {
    input: R,
    out: W,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SessionResult {
    pub rated: usize,
    pub quit: bool,
}

impl<R: BufRead, W: Write> RatingSession<R, W> {
    pub fn new(input: R, out: W) -> Self {
        Self { input, out }
    }

    fn read_line(&mut self) -> anyhow::Result<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line))
    }

    /// `None` means quit (or end of input).
    fn ask(&mut self, dimension: &str) -> anyhow::Result<Option<Option<u8>>> {
        loop {
            write!(self.out, "\n{} (1-7): ", dimension)?;
            self.out.flush()?;
            let Some(line) = self.read_line()? else {
                return Ok(None);
            };
            match parse_answer(&line) {
                Ok(Answer::Score(n)) => return Ok(Some(Some(n))),
                Ok(Answer::Skip) => return Ok(Some(None)),
                Ok(Answer::Quit) => return Ok(None),
                Err(hint) => writeln!(self.out, "  ! {}", hint)?,
            }
        }
    }

    /// Rate every pending joke, calling `save` after each one.
    pub fn run(
        &mut self,
        jokes: &mut [JokeRecord],
        mut save: impl FnMut(&[JokeRecord]) -> anyhow::Result<()>,
    ) -> anyhow::Result<SessionResult> {
        let todo = pending(jokes);
        let total = jokes.iter().filter(|j| j.succeeded()).count();
        let mut result = SessionResult::default();

        'jokes: for (n, idx) in todo.iter().enumerate() {
            let joke = &jokes[*idx];
            writeln!(self.out, "\n{}", "=".repeat(70))?;
            writeln!(
                self.out,
                " JOKE {}/{} ({} already rated)",
                n + 1,
                todo.len(),
                total - todo.len()
            )?;
            writeln!(self.out, "{}", "=".repeat(70))?;
            writeln!(self.out, "\nModel: {}", joke.model)?;
            writeln!(self.out, "Category: {}", joke.category)?;
            writeln!(self.out, "Temperature: {}", joke.temperature)?;
            writeln!(self.out, "\n{}\n", joke.full_text)?;

            let mut scores = [None; 4];
            for (i, dim) in DIMENSIONS.iter().enumerate() {
                match self.ask(dim)? {
                    Some(s) => scores[i] = s,
                    None => {
                        result.quit = true;
                        break 'jokes;
                    }
                }
            }

            write!(self.out, "\nNotes (optional, press ENTER to skip): ")?;
            self.out.flush()?;
            let notes = self.read_line()?.unwrap_or_default().trim().to_string();

            jokes[*idx].manual_ratings = Some(ManualRatings {
                funniness: scores[0],
                category_fit: scores[1],
                structural_coherence: scores[2],
                originality: scores[3],
                notes,
                rated_at: Some(chrono::Utc::now().to_rfc3339()),
            });
            result.rated += 1;
            save(jokes)?;
            writeln!(self.out, "\nSaved! ({} rated this session)", result.rated)?;
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{joke_id, ApiInfo, Category, JokeStatus};

    fn joke(i: usize, ok: bool) -> JokeRecord {
        JokeRecord {
            id: joke_id("m", Category::Social, 0.7, i),
            timestamp: String::new(),
            model: "m".into(),
            model_name: "m".into(),
            category: Category::Social,
            temperature: 0.7,
            prompt_index: i,
            prompt: String::new(),
            raw_response: ok.then(|| "Setup: a?\nPunchline: b".to_string()),
            setup: "a?".into(),
            punchline: "b".into(),
            full_text: "Setup: a?\nPunchline: b".into(),
            word_counts: None,
            status: if ok {
                JokeStatus::Parsed
            } else {
                JokeStatus::GenerationFailed
            },
            parse_error: None,
            api: ApiInfo::default(),
            manual_ratings: None,
        }
    }

    #[test]
    fn answers() {
        assert_eq!(parse_answer(" 7\n"), Ok(Answer::Score(7)));
        assert_eq!(parse_answer("SKIP"), Ok(Answer::Skip));
        assert_eq!(parse_answer("q"), Ok(Answer::Quit));
        assert!(parse_answer("8").is_err());
        assert!(parse_answer("funny").is_err());
    }

    #[test]
    fn session_rates_saves_and_quits() {
        let mut jokes = vec![joke(0, true), joke(1, false), joke(2, true), joke(3, true)];
        // joke 0: invalid then 5, skip, 4, 6, notes; joke 2: quit on first question
        let input = "9\n5\ns\n4\n6\nnice one\nq\n";
        let mut out = Vec::new();
        let mut saves = 0;
        let res = RatingSession::new(input.as_bytes(), &mut out)
            .run(&mut jokes, |_| {
                saves += 1;
                Ok(())
            })
            .unwrap();

        assert_eq!(res, SessionResult { rated: 1, quit: true });
        assert_eq!(saves, 1);
        let r = jokes[0].manual_ratings.as_ref().unwrap();
        assert_eq!(r.funniness, Some(5));
        assert_eq!(r.category_fit, None);
        assert_eq!(r.originality, Some(6));
        assert_eq!(r.notes, "nice one");
        assert!(jokes[2].manual_ratings.is_none());
        assert_eq!(pending(&jokes), vec![2, 3]);
        assert!(String::from_utf8(out).unwrap().contains("between 1 and 7"));
    }
}
