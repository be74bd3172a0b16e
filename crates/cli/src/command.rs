pub const HELP: &str = "\
commands:
  add <rtsp-uri> [alias]   start relaying a source and add it
  select <n>               play stream #n
  list                     show known streams
  help                     show this text
  quit                     exit";

/// One line of user input.
#[derive(Debug, PartialEq, Eq)]
pub enum Command {
    Empty,
    Help,
    List,
    Select(usize),
    Add { uri: String, alias: Option<String> },
    Quit,
}

impl Command {
    pub fn parse(line: &str) -> Result<Self, String> {
        let mut words = line.split_whitespace();
        let Some(verb) = words.next() else {
            return Ok(Self::Empty);
        };

        match verb {
            "help" | "?" => Ok(Self::Help),
            "list" | "ls" => Ok(Self::List),
            "quit" | "exit" | "q" => Ok(Self::Quit),
            "select" | "play" => {
                let arg = words.next().ok_or("usage: select <n>")?;
                arg.parse()
                    .map(Self::Select)
                    .map_err(|_| format!("not a stream number: {arg}"))
            }
            // An empty `add` is passed through so the controller reports it.
            "add" => Ok(Self::Add {
                uri: words.next().unwrap_or_default().to_string(),
                alias: words.next().map(str::to_string),
            }),
            other => Err(format!("unknown command `{other}` (try `help`)")),
        }
    }
}
