//! Destination for `print` statements.

use std::cell::RefCell;
use std::io::Write;
use std::rc::Rc;

#[derive(Clone, Debug, Default)]
pub enum PrintSink {
    #[default]
    Stdout,
    /// Captures output in memory; clones share the same buffer.
    Buffer(Rc<RefCell<String>>),
}

impl PrintSink {
    pub fn buffer() -> Self {
        PrintSink::Buffer(Rc::new(RefCell::new(String::new())))
    }

    pub fn println(&self, line: &str) {
        match self {
            PrintSink::Stdout => {
                let stdout = std::io::stdout();
                let mut handle = stdout.lock();
                // a closed pipe is not a script error
                let _ = writeln!(handle, "{line}");
            }
            PrintSink::Buffer(buffer) => {
                let mut buffer = buffer.borrow_mut();
                buffer.push_str(line);
                buffer.push('\n');
            }
        }
    }

    /// Everything captured so far. Always empty for stdout.
    pub fn contents(&self) -> String {
        match self {
            PrintSink::Stdout => String::new(),
            PrintSink::Buffer(buffer) => buffer.borrow().clone(),
        }
    }
}
