use super::{preview, Previewer};
use ansi_term::Style;
use linefeed::{Interface, ReadResult, Signal};

const HELP: &str = ":list shows the buffer, :clear empties it, :fonts forgets cached fonts, :quit exits";

/// Line-at-a-time editing of a source buffer. Every entered line is appended
/// and the whole buffer is previewed again.
pub fn main_loop(previewer: &mut Previewer) -> std::io::Result<()> {
    let interface = Interface::new("u8g2-preview")?;
    interface.set_prompt("> ")?;
    interface.set_report_signal(Signal::Interrupt, true);
    interface.write_fmt(format_args!("{}\n", Style::new().dimmed().paint(HELP)))?;
    let mut buffer: Vec<String> = vec![];
    loop {
        let line = match interface.read_line()? {
            ReadResult::Input(line) => line,
            ReadResult::Signal(Signal::Interrupt) => {
                interface.set_buffer("")?;
                continue;
            }
            ReadResult::Signal(_) | ReadResult::Eof => break,
        };
        match line.trim() {
            "" => continue,
            ":quit" | ":q" => break,
            ":clear" => {
                buffer.clear();
                continue;
            }
            ":list" => {
                for (index, line) in buffer.iter().enumerate() {
                    interface.write_fmt(format_args!("{:>4} {}\n", index + 1, line))?;
                }
                continue;
            }
            ":fonts" => {
                previewer.forget_fonts();
                continue;
            }
            command if command.starts_with(':') => {
                interface.write_fmt(format_args!(
                    "{}\n",
                    Style::new().bold().paint(format!("UNKNOWN COMMAND {}", command))
                ))?;
                continue;
            }
            _ => {}
        }
        interface.add_history_unique(line.clone());
        buffer.push(line);
        let frame = previewer.preview_source(&buffer.join("\n"));
        interface.write_fmt(format_args!(
            "{}\n{}",
            frame.summary(),
            preview::half_blocks(&frame.canvas, frame.scale)
        ))?;
    }
    Ok(())
}
