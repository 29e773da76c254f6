/// What a line typed at the interactive prompt asks for.
#[derive(Debug, PartialEq, Eq)]
pub enum Command<'a> {
    Quit,
    /// Open the result with this 1-based number.
    Open(usize),
    /// `#` followed by something that is not a result number.
    BadSelection(&'a str),
    /// Anything else is a query, numeric part numbers included.
    Search(&'a str),
}

/// Parses one prompt line. Results are opened with `#N` or `open N`; a bare
/// number such as `7805` and phrases like `open loop gain` are searched for.
pub fn parse_command(line: &str) -> Command<'_> {
    let input = line.trim();
    if input.eq_ignore_ascii_case("quit") || input.eq_ignore_ascii_case("exit") {
        return Command::Quit;
    }
    if let Some(number) = input.strip_prefix('#') {
        let number = number.trim();
        return match number.parse::<usize>() {
            Ok(n) if n > 0 => Command::Open(n),
            _ => Command::BadSelection(number),
        };
    }
    if let Some((word, rest)) = input.split_once(char::is_whitespace)
        && word.eq_ignore_ascii_case("open")
        && let Ok(n) = rest.trim().parse::<usize>()
        && n > 0
    {
        return Command::Open(n);
    }
    Command::Search(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_part_numbers_are_searched() {
        assert_eq!(parse_command("7805"), Command::Search("7805"));
        assert_eq!(parse_command(" 555 \n"), Command::Search("555"));
        assert_eq!(parse_command("1"), Command::Search("1"));
    }

    #[test]
    fn test_explicit_selection_opens() {
        assert_eq!(parse_command("#3"), Command::Open(3));
        assert_eq!(parse_command("# 12"), Command::Open(12));
        assert_eq!(parse_command("open 2"), Command::Open(2));
        assert_eq!(parse_command("OPEN  4"), Command::Open(4));
    }

    #[test]
    fn test_bad_selection() {
        assert_eq!(parse_command("#0"), Command::BadSelection("0"));
        assert_eq!(parse_command("#x"), Command::BadSelection("x"));
    }

    #[test]
    fn test_queries_and_quit() {
        assert_eq!(parse_command("buck converter"), Command::Search("buck converter"));
        assert_eq!(parse_command("opener circuit"), Command::Search("opener circuit"));
        assert_eq!(parse_command("open loop gain"), Command::Search("open loop gain"));
        assert_eq!(parse_command("open 0"), Command::Search("open 0"));
        assert_eq!(parse_command(""), Command::Search(""));
        assert_eq!(parse_command("quit"), Command::Quit);
        assert_eq!(parse_command("Exit"), Command::Quit);
    }
}
