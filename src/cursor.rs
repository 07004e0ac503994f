use crate::{FmIndex, HalfOpenInterval, alphabet::Symbol};

/// A cursor to the FM-Index.
///
/// The cursor implicitly maintains a currently searched query. Symbols can iteratively be
/// added to the front of this query, so repeatedly calling
/// [`extend_query_front`](Cursor::extend_query_front) corresponds to a backward search.
/// At any point, the number of occurrences of the currently searched query can be retrieved
/// cheaply.
#[derive(Clone, Copy)]
pub struct Cursor<'a> {
    pub(crate) index: &'a FmIndex,
    pub(crate) interval: HalfOpenInterval,
    pub(crate) query_len: usize,
}

impl<'a> Cursor<'a> {
    /// Extends the currently searched query at the front by one ASCII symbol.
    ///
    /// A symbol outside of the alphabet leaves the cursor empty.
    /// Each step decodes at most two segments of the compressed BWT.
    pub fn extend_query_front(&mut self, symbol: u8) {
        match Symbol::from_ascii(symbol) {
            Some(symbol) => self.extend_front(symbol),
            None => {
                self.interval = HalfOpenInterval {
                    start: self.interval.start,
                    end: self.interval.start,
                }
            }
        }
    }

    pub fn extend_front(&mut self, symbol: Symbol) {
        if self.is_empty() {
            return;
        }

        // a trailing `$` also matches the terminator of the last sequence in row 0
        self.interval = if self.query_len == 0 && symbol == Symbol::Sentinel {
            HalfOpenInterval {
                start: 0,
                end: self.index.predecessor_count(Symbol::A),
            }
        } else {
            HalfOpenInterval {
                start: self.index.lf_mapping_step(symbol, self.interval.start),
                end: self.index.lf_mapping_step(symbol, self.interval.end),
            }
        };
        self.query_len += 1;
    }

    /// Returns the half open interval of BWT rows of the currently searched query.
    pub fn interval(&self) -> HalfOpenInterval {
        self.interval
    }

    /// Returns the number of occurrences of the currently searched query in the set of
    /// indexed texts.
    pub fn count(&self) -> usize {
        self.interval.len()
    }

    pub fn is_empty(&self) -> bool {
        self.interval.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use crate::FmIndexConfig;

    #[test]
    fn incremental_search() {
        let index = FmIndexConfig::new()
            .construct_from_texts([b"ACGT", b"ACGA"])
            .unwrap();

        let mut cursor = index.cursor_empty();
        assert_eq!(cursor.count(), index.len());

        let mut counts = Vec::new();
        for &symbol in b"ACG".iter().rev() {
            cursor.extend_query_front(symbol);
            counts.push(cursor.count());
        }

        // G, CG, ACG
        assert_eq!(counts, [2, 2, 2]);
        assert_eq!(cursor.interval(), index.backward_search_interval(b"ACG"));

        cursor.extend_query_front(b'$');
        assert_eq!(cursor.count(), 1);

        cursor.extend_query_front(b'N');
        assert!(cursor.is_empty());

        cursor.extend_query_front(b'A');
        assert!(cursor.is_empty());
    }

    #[test]
    fn trailing_sentinel_matches_every_sequence_end() {
        let index = FmIndexConfig::new()
            .construct_from_texts([b"ACGT", b"ACGA"])
            .unwrap();

        let mut cursor = index.cursor_empty();
        cursor.extend_query_front(b'$');
        assert_eq!(cursor.count(), index.num_sequences());
        assert_eq!(cursor.interval().start, 0);

        cursor.extend_query_front(b'A');
        assert_eq!(cursor.count(), 1);

        let mut cursor = index.cursor_empty();
        cursor.extend_query_front(b'$');
        cursor.extend_query_front(b'T');
        assert_eq!(cursor.count(), 1);
    }
}
