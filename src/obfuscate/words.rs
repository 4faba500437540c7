// SPDX-License-Identifier: AGPL-3.0-only
// SPDX-FileCopyrightText: 2025 Steve Clarke <stephenlclarke@mac.com> - https://xyzzy.tools

//! Sources of randomness for the obfuscators.  Each job owns its own
//! source, so nothing here is global and tests can swap in a script.

use super::dates::DateFormat;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Lowercase filler words used as element names.  All are valid XML names.
const WORDS: &[&str] = &[
    "alias", "amet", "animi", "aperiam", "aspernatur", "atque", "autem", "beatae", "blanditiis",
    "commodi", "consequatur", "corporis", "culpa", "cumque", "debitis", "delectus", "deleniti",
    "dicta", "dolor", "dolore", "dolorem", "doloribus", "ducimus", "earum", "eius", "eligendi",
    "enim", "error", "esse", "eveniet", "excepturi", "exercitationem", "expedita", "explicabo",
    "facere", "facilis", "fuga", "fugiat", "fugit", "harum", "hic", "illo", "impedit", "incidunt",
    "inventore", "ipsa", "ipsam", "ipsum", "iste", "itaque", "iure", "iusto", "labore",
    "laboriosam", "laudantium", "libero", "magnam", "magni", "maiores", "maxime", "minima",
    "minus", "modi", "molestiae", "mollitia", "natus", "neque", "nesciunt", "nihil", "nisi",
    "nobis", "nostrum", "nulla", "numquam", "obcaecati", "odio", "odit", "officia", "officiis",
    "omnis", "optio", "pariatur", "perferendis", "perspiciatis", "placeat", "porro", "possimus",
    "praesentium", "provident", "quae", "quaerat", "quam", "quas", "quasi", "quia", "quibusdam",
    "quidem", "quis", "quisquam", "quod", "quos", "ratione", "recusandae", "reiciendis", "rem",
    "repellat", "repellendus", "reprehenderit", "repudiandae", "rerum", "saepe", "sapiente",
    "sequi", "similique", "sint", "sit", "soluta", "sunt", "suscipit", "tempora", "tempore",
    "temporibus", "tenetur", "totam", "ullam", "unde", "ut", "vel", "velit", "veniam",
    "veritatis", "vero", "vitae", "voluptas", "voluptate", "voluptatem", "voluptates",
    "voluptatibus", "voluptatum",
];

/// Produces a lowercase word on every call.  Words may repeat.
pub trait WordSource {
    fn next_word(&mut self) -> String;
}

/// Picks the output format for each rewritten date.
pub trait FormatChooser {
    fn choose_format(&mut self) -> DateFormat;
}

/// `rand`-backed implementation of both capabilities.
pub struct RandomSource<R = StdRng> {
    rng: R,
}

impl RandomSource<StdRng> {
    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }

    /// Reproducible source, handy when comparing runs.
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> RandomSource<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: Rng> WordSource for RandomSource<R> {
    fn next_word(&mut self) -> String {
        WORDS[self.rng.gen_range(0..WORDS.len())].to_string()
    }
}

impl<R: Rng> FormatChooser for RandomSource<R> {
    fn choose_format(&mut self) -> DateFormat {
        DateFormat::ALL[self.rng.gen_range(0..DateFormat::ALL.len())]
    }
}

/// Replays fixed words and formats in a loop.
#[cfg(test)]
pub(crate) struct Scripted {
    words: Vec<String>,
    formats: Vec<DateFormat>,
    word_at: usize,
    format_at: usize,
}

#[cfg(test)]
impl Scripted {
    pub(crate) fn words(words: &[&str]) -> Self {
        Self {
            words: words.iter().map(|w| w.to_string()).collect(),
            formats: DateFormat::ALL.to_vec(),
            word_at: 0,
            format_at: 0,
        }
    }

    pub(crate) fn formats(formats: &[DateFormat]) -> Self {
        Self {
            words: vec!["word".to_string()],
            formats: formats.to_vec(),
            word_at: 0,
            format_at: 0,
        }
    }
}

#[cfg(test)]
impl WordSource for Scripted {
    fn next_word(&mut self) -> String {
        let word = self.words[self.word_at % self.words.len()].clone();
        self.word_at += 1;
        word
    }
}

#[cfg(test)]
impl FormatChooser for Scripted {
    fn choose_format(&mut self) -> DateFormat {
        let format = self.formats[self.format_at % self.formats.len()];
        self.format_at += 1;
        format
    }
}
