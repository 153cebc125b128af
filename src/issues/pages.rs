//! Collecting every page of a search into a single list of issues.
//!
//! Backends page in one of two ways: JIRA takes a numeric offset and reports the total number of
//! matches, GitHub hands back an opaque cursor and a "has next page" flag. [`fetch_all`] drives
//! either style.

use log::debug;
use miette::Diagnostic;

/// Which page to request next.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) enum Cursor {
    /// The first page, for either style of paging.
    Start,
    /// Skip this many results.
    Offset(u64),
    /// The page after the one which returned this cursor.
    After(String),
}

impl Cursor {
    /// The number of results to skip, for offset-based backends.
    pub(crate) fn offset(&self) -> u64 {
        match self {
            Self::Offset(offset) => *offset,
            Self::Start | Self::After(_) => 0,
        }
    }

    /// The cursor to resume after, for cursor-based backends.
    pub(crate) fn after(&self) -> Option<&str> {
        match self {
            Self::After(cursor) => Some(cursor),
            Self::Start | Self::Offset(_) => None,
        }
    }
}

/// What a backend knows about the results beyond the page it just returned.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) enum Remaining {
    /// The total number of matches across all pages.
    Total(u64),
    /// There is another page, starting after this cursor.
    Next(String),
    /// That was the last page.
    Done,
}

#[derive(Clone, Debug)]
pub(crate) struct Page<T> {
    pub(crate) issues: Vec<T>,
    pub(crate) remaining: Remaining,
}

/// A single search against one backend which can be fetched a page at a time.
pub(crate) trait SearchPages {
    type Issue;
    type Error;

    fn fetch_page(&mut self, cursor: &Cursor) -> Result<Page<Self::Issue>, Self::Error>;
}

/// Fetch every page of `search`, keeping issues in the order the backend returned them.
///
/// The first failed request ends the whole fetch, nothing fetched before it is returned. So does
/// a page that comes back empty before the reported total is reached.
pub(crate) fn fetch_all<S>(search: &mut S) -> Result<Vec<S::Issue>, S::Error>
where
    S: SearchPages,
    S::Error: From<Error>,
{
    let mut issues = Vec::new();
    let mut cursor = Cursor::Start;
    loop {
        let page = search.fetch_page(&cursor)?;
        let received = page.issues.len();
        issues.extend(page.issues);
        debug!(
            "Received {received} issues at {cursor:?}, {} so far",
            issues.len()
        );
        cursor = match page.remaining {
            Remaining::Total(total) => {
                let fetched = issues.len() as u64;
                if fetched >= total {
                    break;
                }
                if received == 0 {
                    return Err(Error::ShortPage { total, fetched }.into());
                }
                Cursor::Offset(fetched)
            }
            Remaining::Next(next) => Cursor::After(next),
            Remaining::Done => break,
        };
    }
    Ok(issues)
}

#[derive(Debug, Diagnostic, Eq, PartialEq, thiserror::Error)]
pub(crate) enum Error {
    #[error("Search reported {total} issues but stopped returning them after {fetched}")]
    #[diagnostic(
        code(issues::pages::short_page),
        help("The issue tracker may have changed while paging, try again")
    )]
    ShortPage { total: u64, fetched: u64 },
}

#[cfg(test)]
mod test_fetch_all {
    use pretty_assertions::assert_eq;

    use super::*;

    /// Serves a fixed corpus of numbers, `page_size` at a time, recording each cursor it's asked
    /// for.
    struct FakeSearch {
        corpus: Vec<u64>,
        page_size: usize,
        use_cursor: bool,
        requests: Vec<Cursor>,
        fail_on_request: Option<usize>,
    }

    impl FakeSearch {
        fn new(len: u64, page_size: usize, use_cursor: bool) -> Self {
            Self {
                corpus: (0..len).collect(),
                page_size,
                use_cursor,
                requests: Vec::new(),
                fail_on_request: None,
            }
        }
    }

    #[derive(Debug, Eq, PartialEq)]
    enum FakeError {
        ConnectionReset,
        Pages(Error),
    }

    impl From<Error> for FakeError {
        fn from(err: Error) -> Self {
            Self::Pages(err)
        }
    }

    impl SearchPages for FakeSearch {
        type Issue = u64;
        type Error = FakeError;

        fn fetch_page(&mut self, cursor: &Cursor) -> Result<Page<u64>, FakeError> {
            self.requests.push(cursor.clone());
            if self.fail_on_request == Some(self.requests.len()) {
                return Err(FakeError::ConnectionReset);
            }
            let start = if self.use_cursor {
                cursor.after().map_or(0, |after| after.parse().unwrap())
            } else {
                cursor.offset() as usize
            };
            let end = (start + self.page_size).min(self.corpus.len());
            let issues = self.corpus[start..end].to_vec();
            let remaining = if !self.use_cursor {
                Remaining::Total(self.corpus.len() as u64)
            } else if end < self.corpus.len() {
                Remaining::Next(end.to_string())
            } else {
                Remaining::Done
            };
            Ok(Page { issues, remaining })
        }
    }

    #[test]
    fn offset_paging() {
        let mut search = FakeSearch::new(201, 100, false);
        let issues = fetch_all(&mut search).unwrap();
        assert_eq!(issues, (0..201).collect::<Vec<_>>());
        assert_eq!(
            search.requests,
            vec![Cursor::Start, Cursor::Offset(100), Cursor::Offset(200)]
        );
    }

    #[test]
    fn cursor_paging() {
        let mut search = FakeSearch::new(201, 100, true);
        let issues = fetch_all(&mut search).unwrap();
        assert_eq!(issues, (0..201).collect::<Vec<_>>());
        assert_eq!(
            search.requests,
            vec![
                Cursor::Start,
                Cursor::After(String::from("100")),
                Cursor::After(String::from("200"))
            ]
        );
    }

    #[test]
    fn exact_multiple_of_page_size() {
        let mut search = FakeSearch::new(200, 100, false);
        let issues = fetch_all(&mut search).unwrap();
        assert_eq!(issues.len(), 200);
        assert_eq!(search.requests.len(), 2);
    }

    #[test]
    fn no_results() {
        let mut search = FakeSearch::new(0, 100, false);
        assert!(fetch_all(&mut search).unwrap().is_empty());
        assert_eq!(search.requests.len(), 1);
    }

    #[test]
    fn empty_page_before_total_is_an_error() {
        struct ShortTotal;
        impl SearchPages for ShortTotal {
            type Issue = u64;
            type Error = FakeError;

            fn fetch_page(&mut self, cursor: &Cursor) -> Result<Page<u64>, FakeError> {
                let issues = if cursor == &Cursor::Start { vec![1] } else { vec![] };
                Ok(Page {
                    issues,
                    remaining: Remaining::Total(5),
                })
            }
        }

        assert_eq!(
            fetch_all(&mut ShortTotal),
            Err(FakeError::Pages(Error::ShortPage {
                total: 5,
                fetched: 1
            }))
        );
    }

    #[test]
    fn error_discards_partial_results() {
        let mut search = FakeSearch::new(201, 100, true);
        search.fail_on_request = Some(2);
        assert_eq!(fetch_all(&mut search), Err(FakeError::ConnectionReset));
        assert_eq!(search.requests.len(), 2);
    }
}
