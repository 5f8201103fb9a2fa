//! Run a list of shell tasks spread over the ranks of a communicator
use crate::traits::LineRecord;
use crate::Result;
use log::{debug, warn};
use std::io::{Read, Write};
use std::process::{Command, ExitStatus, Stdio};

/// Runs every `size`-th line of a task file as a command, starting with line `rank`
///
/// The first word of a line is the program and the remaining words are its arguments. For every
/// task the log receives the line, the combined output of the command and a closing marker.
/// Standard output and standard error share one pipe, so they appear in the order the command
/// wrote them.
pub struct TaskRunner<W: Write> {
    rank: usize,
    size: usize,
    line: usize,
    log: W,
}

impl<W: Write> TaskRunner<W> {
    /// Create a runner for rank `rank` out of `size`, writing to `log`
    pub fn new(rank: usize, size: usize, log: W) -> Self {
        Self {
            rank,
            size,
            line: 0,
            log,
        }
    }

    /// Number of task lines seen so far, including those run by other ranks
    pub fn lines(&self) -> usize {
        self.line
    }

    /// The log
    pub fn into_log(self) -> W {
        self.log
    }

    fn run(&mut self, task: &str) -> Result<()> {
        let mut words = task.split_whitespace();
        let Some(program) = words.next() else {
            return Ok(());
        };
        debug!("Rank {} running `{task}`", self.rank);

        writeln!(self.log, "--> {task}")?;
        match combined_output(program, words) {
            Ok((status, output)) => {
                if !status.success() {
                    warn!("`{task}` failed with {status}");
                    writeln!(self.log, "-->ERROR : {status}")?;
                    writeln!(self.log, "-->Output follows :")?;
                }
                self.log.write_all(&output)?;
            }
            Err(e) => {
                warn!("`{task}` could not be started: {e}");
                writeln!(self.log, "-->ERROR : {e}")?;
                writeln!(self.log, "-->Output follows :")?;
            }
        }
        writeln!(self.log)?;
        writeln!(self.log, "-->")?;
        self.log.flush()?;
        Ok(())
    }
}

/// Run a program with standard output and standard error written to the same pipe
fn combined_output<'a>(
    program: &str,
    args: impl Iterator<Item = &'a str>,
) -> std::io::Result<(ExitStatus, Vec<u8>)> {
    let (mut reader, writer) = std::io::pipe()?;
    let mut child = {
        // The command holds write ends of the pipe until it is dropped
        let mut command = Command::new(program);
        command
            .args(args)
            .stdin(Stdio::null())
            .stdout(writer.try_clone()?)
            .stderr(writer);
        command.spawn()?
    };
    let mut output = vec![];
    let read = reader.read_to_end(&mut output);
    let status = child.wait()?;
    read?;
    Ok((status, output))
}

impl<W: Write> LineRecord for TaskRunner<W> {
    fn add(&mut self, line: &str) -> Result<()> {
        if self.line % self.size == self.rank {
            self.run(line)?;
        }
        self.line += 1;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::lineio::LineReader;

    const TASKS: &str = "# tasks\necho zero\necho one two\necho three\n";

    fn run(rank: usize, size: usize) -> String {
        let mut runner = TaskRunner::new(rank, size, vec![]);
        LineReader::default()
            .parse(TASKS.as_bytes(), &mut runner)
            .unwrap();
        assert_eq!(runner.lines(), 3);
        String::from_utf8(runner.into_log()).unwrap()
    }

    #[cfg(unix)]
    #[test]
    fn test_single_rank() {
        assert_eq!(
            run(0, 1),
            "--> echo zero\nzero\n\n-->\n--> echo one two\none two\n\n-->\n--> echo three\nthree\n\n-->\n"
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_round_robin() {
        assert_eq!(
            run(0, 2),
            "--> echo zero\nzero\n\n-->\n--> echo three\nthree\n\n-->\n"
        );
        assert_eq!(run(1, 2), "--> echo one two\none two\n\n-->\n");
        assert_eq!(run(3, 4), "");
    }

    #[cfg(unix)]
    #[test]
    fn test_output_order() {
        let name = format!("ndparticles-{}-order.sh", std::process::id());
        let script = std::env::temp_dir().join(name);
        std::fs::write(&script, "echo out1\necho err1 >&2\necho out2\nexit 3\n").unwrap();
        let mut runner = TaskRunner::new(0, 1, vec![]);
        runner.add(&format!("sh {}", script.display())).unwrap();
        std::fs::remove_file(&script).unwrap();

        let log = String::from_utf8(runner.into_log()).unwrap();
        let lines = log.lines().collect::<Vec<_>>();
        assert!(lines[1].starts_with("-->ERROR : "));
        assert_eq!(lines[2], "-->Output follows :");
        assert_eq!(&lines[3..], &["out1", "err1", "out2", "", "-->"]);
    }

    #[test]
    fn test_missing_program() {
        let mut runner = TaskRunner::new(0, 1, vec![]);
        runner.add("ndparticles-no-such-program --flag").unwrap();
        let log = String::from_utf8(runner.into_log()).unwrap();
        assert!(log.starts_with("--> ndparticles-no-such-program --flag\n-->ERROR : "));
        assert!(log.ends_with("-->Output follows :\n\n-->\n"));
    }
}
