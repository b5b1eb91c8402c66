use std::io::{self, BufRead, Write};

/// Single blocking line prompt. All interactive input goes through this so
/// the resolver can be driven by canned answers in tests.
pub trait Prompt {
    fn ask(&mut self, text: &str) -> io::Result<String>;
}

pub struct StdinPrompt;

impl Prompt for StdinPrompt {
    fn ask(&mut self, text: &str) -> io::Result<String> {
        let mut input = String::new();
        print!("{text}");
        io::stdout().flush()?;
        io::stdin().lock().read_line(&mut input)?;
        Ok(input.trim_end_matches(['\r', '\n']).to_string())
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::VecDeque;
    use std::io;

    use super::Prompt;

    /// Pops pre-scripted answers; panics when asked more often than the
    /// script allows, which is exactly the at-most-once property the
    /// resolver has to uphold.
    pub struct ScriptedPrompt {
        answers: VecDeque<String>,
        pub asked: Vec<String>,
    }

    impl ScriptedPrompt {
        pub fn new(answers: &[&str]) -> Self {
            Self {
                answers: answers.iter().map(|s| s.to_string()).collect(),
                asked: Vec::new(),
            }
        }

        pub fn exhausted(&self) -> bool {
            self.answers.is_empty()
        }
    }

    impl Prompt for ScriptedPrompt {
        fn ask(&mut self, text: &str) -> io::Result<String> {
            self.asked.push(text.to_string());
            match self.answers.pop_front() {
                Some(answer) => Ok(answer),
                None => panic!("prompt asked more times than scripted: {text}"),
            }
        }
    }
}
