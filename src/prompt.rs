//! Interactive mode: asks for the settings on the terminal instead of taking
//! them from the command line.

use std::io::{BufRead, Write};
use std::path::PathBuf;

use crate::config::{Error, Result, Settings, DEFAULT_NUM_POSTS};

/// Asks for every setting on `output` and reads the answers from `input`.
/// Blank answers (and end of input) leave a setting unset so that lower tiers
/// still apply to it.
pub fn ask<R: BufRead, W: Write>(input: &mut R, output: &mut W) -> Result<Settings> {
    let mut prompter = Prompter { input, output };
    let mut settings = Settings {
        input_dir: prompter.path("Directory containing your Markdown files")?,
        output_dir: prompter.path("Directory where the generated HTML files should be saved")?,
        post_template_path: prompter.path("Path to your post HTML template")?,
        index_template_path: prompter.path("Path to your main index HTML template")?,
        ..Settings::default()
    };

    if prompter.confirm("Generate a page listing all tags?")? {
        settings.all_tags_template_path = prompter.path("Path to your all-tags HTML template")?;
    }
    if prompter.confirm("Generate individual pages for each tag?")? {
        settings.tag_template_path = prompter.path("Path to your tag page HTML template")?;
    }
    if prompter.confirm("Generate a page listing all posts?")? {
        settings.all_posts_template_path = prompter.path("Path to your all-posts HTML template")?;
    }
    settings.num_posts = prompter.number(&format!(
        "How many of the latest posts should the main index page show? (default is {})",
        DEFAULT_NUM_POSTS
    ))?;
    Ok(settings)
}

struct Prompter<'a, R, W> {
    input: &'a mut R,
    output: &'a mut W,
}

impl<R: BufRead, W: Write> Prompter<'_, R, W> {
    /// Returns the trimmed answer, or `None` for a blank answer.
    fn answer(&mut self, question: &str) -> Result<Option<String>> {
        write!(self.output, "{} ", question).map_err(Error::Prompt)?;
        self.output.flush().map_err(Error::Prompt)?;
        let mut line = String::new();
        self.input.read_line(&mut line).map_err(Error::Prompt)?;
        let answer = line.trim();
        Ok(if answer.is_empty() {
            None
        } else {
            Some(answer.to_owned())
        })
    }

    fn path(&mut self, question: &str) -> Result<Option<PathBuf>> {
        Ok(self.answer(&format!("{}:", question))?.map(PathBuf::from))
    }

    fn confirm(&mut self, question: &str) -> Result<bool> {
        Ok(self
            .answer(&format!("{} (y/n)", question))?
            .map_or(false, |a| a.eq_ignore_ascii_case("y") || a.eq_ignore_ascii_case("yes")))
    }

    /// Asks again until the answer is blank or a non-negative integer.
    fn number(&mut self, question: &str) -> Result<Option<usize>> {
        loop {
            match self.answer(question)? {
                None => return Ok(None),
                Some(answer) => match answer.parse() {
                    Ok(n) => return Ok(Some(n)),
                    Err(_) => writeln!(self.output, "`{}` is not a number of posts", answer)
                        .map_err(Error::Prompt)?,
                },
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Cursor;

    fn ask_with(answers: &str) -> Settings {
        let mut input = Cursor::new(answers.as_bytes().to_vec());
        let mut output = Vec::new();
        ask(&mut input, &mut output).unwrap()
    }

    #[test]
    fn test_all_answers() {
        let settings = ask_with("in\nout\npost.html\nindex.html\ny\nall_tags.html\nYes\ntag.html\nn\n3\n");
        assert_eq!(
            Settings {
                input_dir: Some(PathBuf::from("in")),
                output_dir: Some(PathBuf::from("out")),
                post_template_path: Some(PathBuf::from("post.html")),
                index_template_path: Some(PathBuf::from("index.html")),
                tag_template_path: Some(PathBuf::from("tag.html")),
                all_tags_template_path: Some(PathBuf::from("all_tags.html")),
                all_posts_template_path: None,
                num_posts: Some(3),
                threads: None,
            },
            settings
        );
    }

    #[test]
    fn test_blank_answers_leave_settings_unset() {
        let settings = ask_with("\n\n\n\nn\nn\nn\n\n");
        assert_eq!(Settings::default(), settings);
    }

    #[test]
    fn test_end_of_input() {
        let settings = ask_with("in");
        assert_eq!(
            Settings {
                input_dir: Some(PathBuf::from("in")),
                ..Settings::default()
            },
            settings
        );
    }

    #[test]
    fn test_number_is_asked_again() {
        let settings = ask_with("\n\n\n\nn\nn\nn\nlots\n-2\n12\n");
        assert_eq!(Some(12), settings.num_posts);
    }
}
