//! Classification of one line of terminal input.

/// What a single input line asks the terminal to do.
///
/// Keywords are matched on the trimmed, lowercased line and win over
/// everything else, so a line consisting only of `ls` never reaches SQLite.
/// Integer recall is tried after the keywords.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Exit,
    List,
    Unstar,
    Star,
    Zip,
    Recall(i64),
    /// Raw line to accumulate as SQL
    Fragment(String),
}

impl Command {
    pub fn parse(line: &str) -> Self {
        let trimmed = line.trim();
        match trimmed.to_lowercase().as_str() {
            "exit" => Command::Exit,
            "ls" => Command::List,
            "unstar" => Command::Unstar,
            "star" => Command::Star,
            "zip" => Command::Zip,
            _ => match trimmed.parse::<i64>() {
                Ok(id) => Command::Recall(id),
                Err(_) => Command::Fragment(line.to_string()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keywords_ignore_case_and_padding() {
        assert_eq!(Command::parse("exit"), Command::Exit);
        assert_eq!(Command::parse("  LS "), Command::List);
        assert_eq!(Command::parse("Star"), Command::Star);
        assert_eq!(Command::parse("UNSTAR"), Command::Unstar);
        assert_eq!(Command::parse("zip\t"), Command::Zip);
    }

    #[test]
    fn integers_recall_bookmarks() {
        assert_eq!(Command::parse("3"), Command::Recall(3));
        assert_eq!(Command::parse("  12  "), Command::Recall(12));
        assert_eq!(Command::parse("-1"), Command::Recall(-1));
    }

    #[test]
    fn everything_else_is_a_raw_fragment() {
        assert_eq!(
            Command::parse("  SELECT * FROM ls"),
            Command::Fragment("  SELECT * FROM ls".to_string())
        );
        assert_eq!(Command::parse("1;"), Command::Fragment("1;".to_string()));
        assert_eq!(Command::parse(""), Command::Fragment(String::new()));
        assert_eq!(Command::parse("star;"), Command::Fragment("star;".to_string()));
    }
}
