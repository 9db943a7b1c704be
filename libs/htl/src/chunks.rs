//! Lazy traversal of a template as a finite sequence of text chunks.
//!
//! A cursor is an explicit stack of frames, one per template or list
//! currently being walked; nothing is rendered ahead of time, and
//! every call to `Tpl::chunks` hands out an independent cursor.

use std::io::{self, Read};

use crate::tpl::{Step, Tpl, Value};

enum Frame {
    Node { node: Tpl, pos: usize },
    List { values: Vec<Value>, pos: usize },
}

enum Action {
    Pop,
    Chunk(String),
    Descend(Value),
}

pub struct Chunks {
    stack: Vec<Frame>,
}

impl Chunks {
    pub(crate) fn new(node: Tpl) -> Chunks {
        Chunks {
            stack: vec![Frame::Node { node, pos: 0 }],
        }
    }
}

impl Iterator for Chunks {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        loop {
            let action = {
                let frame = self.stack.last_mut()?;
                match frame {
                    Frame::Node { node, pos } => {
                        let step = node.step(*pos);
                        *pos += 1;
                        match step {
                            Step::Done => Action::Pop,
                            Step::Segment(segment) => Action::Chunk(segment),
                            Step::Value(value) => Action::Descend(value),
                        }
                    }
                    Frame::List { values, pos } => {
                        if *pos < values.len() {
                            let value = values[*pos].clone();
                            *pos += 1;
                            Action::Descend(value)
                        } else {
                            Action::Pop
                        }
                    }
                }
            };
            match action {
                Action::Pop => {
                    self.stack.pop();
                }
                Action::Chunk(chunk) => return Some(chunk),
                Action::Descend(value) => match value {
                    Value::None => return Some(String::new()),
                    Value::Str(s) => return Some(s),
                    Value::Tpl(node) => self.stack.push(Frame::Node { node, pos: 0 }),
                    Value::List(values) => self.stack.push(Frame::List { values, pos: 0 }),
                },
            }
        }
    }
}

/// `std::io::Read` over a chunk cursor, so a template can be handed
/// to a transport's write buffering without rendering the whole
/// document first.
pub struct ChunkReader {
    chunks: Chunks,
    buf: Vec<u8>,
    pos: usize,
}

impl ChunkReader {
    pub(crate) fn new(chunks: Chunks) -> ChunkReader {
        ChunkReader {
            chunks,
            buf: Vec::new(),
            pos: 0,
        }
    }
}

impl Read for ChunkReader {
    fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
        if out.is_empty() {
            return Ok(0);
        }
        while self.pos >= self.buf.len() {
            match self.chunks.next() {
                Some(chunk) => {
                    self.buf = chunk.into_bytes();
                    self.pos = 0;
                }
                None => return Ok(0),
            }
        }
        let n = (self.buf.len() - self.pos).min(out.len());
        out[..n].copy_from_slice(&self.buf[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }
}
