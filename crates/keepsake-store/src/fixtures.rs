//! Storable types shared by the store tests.

use keepsake_codec::{Codec, CodecResult, Document, DocumentReader, Storable};

#[derive(Clone, Debug, PartialEq)]
pub struct Note {
    pub text: String,
}

impl Note {
    pub fn new(text: &str) -> Self {
        Self { text: text.to_string() }
    }
}

impl Storable for Note {
    const TYPE_NAME: &'static str = "Note";

    fn write_fields(&self, doc: Document) -> Document {
        doc.set("text", &self.text)
    }

    fn read_fields(reader: &DocumentReader<'_>) -> CodecResult<Self> {
        Ok(Self { text: reader.get("text")? })
    }
}

/// Current task type. Older builds wrote it as `Todo` with a `finished` key.
#[derive(Clone, Debug, PartialEq)]
pub struct Task {
    pub title: String,
    pub done: bool,
}

impl Task {
    pub fn new(title: &str, done: bool) -> Self {
        Self {
            title: title.to_string(),
            done,
        }
    }
}

impl Storable for Task {
    const TYPE_NAME: &'static str = "Task";

    fn write_fields(&self, doc: Document) -> Document {
        doc.set("title", &self.title).set("done", self.done)
    }

    fn read_fields(reader: &DocumentReader<'_>) -> CodecResult<Self> {
        Ok(Self {
            title: reader.get("title")?,
            done: reader.get_with_legacy("done", &["finished"])?,
        })
    }
}

/// The shape older builds wrote. Never registered: it only produces rows.
#[derive(Clone, Debug, PartialEq)]
pub struct Todo {
    pub title: String,
    pub finished: bool,
}

impl Storable for Todo {
    const TYPE_NAME: &'static str = "Todo";

    fn write_fields(&self, doc: Document) -> Document {
        doc.set("title", &self.title).set("finished", self.finished)
    }

    fn read_fields(reader: &DocumentReader<'_>) -> CodecResult<Self> {
        Ok(Self {
            title: reader.get("title")?,
            finished: reader.get("finished")?,
        })
    }
}

/// A codec with `Note` and `Task` registered and `Todo` renamed to `Task`.
pub fn codec() -> Codec {
    let codec = Codec::default();
    codec.register::<Note>().unwrap();
    codec.register::<Task>().unwrap();
    codec.legacy().register_refactor("Todo", "Task");
    codec
}
