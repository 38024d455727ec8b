// =============== Imports ================
use console::{Style, style};
use dialoguer::theme::Theme;
use fuzzy_matcher::{FuzzyMatcher, skim::SkimMatcherV2};
use std::fmt;

// Picker theme for episodes and streams: magenta prompts, a ">>" cursor
// and bold fuzzy matches. Anything not overridden is dialoguer's plain theme.
pub struct CustomTheme {}

fn cursor(active: bool) -> String {
    if active {
        style(">>").magenta().bold().to_string()
    } else {
        "  ".to_string()
    }
}

impl Theme for CustomTheme {
    fn format_prompt(&self, f: &mut dyn fmt::Write, prompt: &str) -> fmt::Result {
        write!(f, "{}", Style::new().magenta().bold().apply_to(prompt))
    }

    fn format_error(&self, f: &mut dyn fmt::Write, err: &str) -> fmt::Result {
        log::debug!("Prompt error: {}", err);
        write!(f, "{} {}", style("error:").red().bold(), err)
    }

    fn format_select_prompt(&self, f: &mut dyn fmt::Write, prompt: &str) -> fmt::Result {
        self.format_prompt(f, prompt)
    }

    fn format_select_prompt_item(
        &self,
        f: &mut dyn fmt::Write,
        text: &str,
        active: bool,
    ) -> fmt::Result {
        if active {
            write!(f, "{} {}", cursor(true), style(text).bold())
        } else {
            write!(f, "{} {}", cursor(false), text)
        }
    }

    fn format_fuzzy_select_prompt(
        &self,
        f: &mut dyn fmt::Write,
        prompt: &str,
        search_term: &str,
        bytes_pos: usize,
    ) -> fmt::Result {
        if !prompt.is_empty() {
            write!(f, "{} ", Style::new().magenta().bold().apply_to(prompt))?;
        }
        let (head, tail) = search_term.split_at(bytes_pos);
        write!(f, "{}{}{}", head, style("_").dim(), tail)
    }

    fn format_fuzzy_select_prompt_item(
        &self,
        f: &mut dyn fmt::Write,
        text: &str,
        active: bool,
        highlight_matches: bool,
        matcher: &SkimMatcherV2,
        search_term: &str,
    ) -> fmt::Result {
        write!(f, "{} ", cursor(active))?;

        let indices = if highlight_matches {
            matcher
                .fuzzy_indices(text, search_term)
                .map(|(_, indices)| indices)
                .unwrap_or_default()
        } else {
            Vec::new()
        };

        for (idx, c) in text.chars().enumerate() {
            if indices.contains(&idx) {
                write!(f, "{}", style(c).for_stderr().magenta().bold())?;
            } else {
                write!(f, "{}", c)?;
            }
        }
        Ok(())
    }
}
