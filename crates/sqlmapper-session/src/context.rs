//! Per-thread ambient page.
//!
//! [`PageHelper::page`] installs a page for the duration of a closure, so any
//! SELECT issued through a mapper on this thread is paginated without the page
//! being passed explicitly. The slot is restored when the closure returns,
//! fails or panics.

use std::cell::RefCell;

use sqlmapper_core::Result;

use crate::page::{Page, Pageable};

thread_local! {
    static LOCAL_PAGE: RefCell<Option<Page<()>>> = const { RefCell::new(None) };
}

/// Restores the previous slot content on drop.
struct LocalPageGuard {
    previous: Option<Page<()>>,
}

impl Drop for LocalPageGuard {
    fn drop(&mut self) {
        let previous = self.previous.take();
        LOCAL_PAGE.with_borrow_mut(|slot| *slot = previous);
    }
}

/// Entry point for ambient pagination.
pub struct PageHelper;

impl PageHelper {
    /// Run `select` with page `current` of `size` rows installed on this thread,
    /// returning its records together with the total the rewriter counted.
    ///
    /// ```ignore
    /// let page = PageHelper::page(2, 10, || mapper.select_list(None))?;
    /// ```
    pub fn page<T, F>(current: i64, size: i64, select: F) -> Result<Page<T>>
    where
        F: FnOnce() -> Result<Vec<T>>,
    {
        let request: Page<()> = Page::new(current, size);
        let _guard = LocalPageGuard {
            previous: LOCAL_PAGE.with_borrow_mut(|slot| slot.replace(request.clone())),
        };

        let records = select()?;
        let counted = Self::local_page().unwrap_or(request);
        Ok(counted.map_records(records))
    }

    /// Snapshot of the page installed on this thread.
    pub fn local_page() -> Option<Page<()>> {
        LOCAL_PAGE.with_borrow(Clone::clone)
    }

    /// Remove the page installed on this thread.
    pub fn clear() {
        LOCAL_PAGE.with_borrow_mut(|slot| *slot = None);
    }

    /// Run `f` on the installed page, if any.
    ///
    /// The page is taken out of the slot while `f` runs, so `f` may issue
    /// queries of its own without re-entering it.
    pub(crate) fn with_local_page<R>(f: impl FnOnce(Option<&mut dyn Pageable>) -> R) -> R {
        let Some(mut page) = LOCAL_PAGE.with_borrow_mut(Option::take) else {
            return f(None);
        };
        let result = f(Some(&mut page as &mut dyn Pageable));
        LOCAL_PAGE.with_borrow_mut(|slot| *slot = Some(page));
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlmapper_core::Error;

    #[test]
    fn installs_and_clears() {
        assert!(PageHelper::local_page().is_none());
        let page = PageHelper::page(2, 5, || {
            let local = PageHelper::local_page().unwrap();
            assert_eq!((local.current(), local.size()), (2, 5));
            Ok(vec![1, 2])
        })
        .unwrap();
        assert_eq!(page.records(), &[1, 2]);
        assert!(PageHelper::local_page().is_none());
    }

    #[test]
    fn cleared_after_error() {
        let result: Result<Page<i32>> =
            PageHelper::page(1, 10, || Err(Error::Precondition("boom".into())));
        assert!(result.is_err());
        assert!(PageHelper::local_page().is_none());
    }

    #[test]
    fn cleared_after_panic() {
        let outcome = std::panic::catch_unwind(|| {
            let _ = PageHelper::page::<i32, _>(1, 10, || panic!("select failed"));
        });
        assert!(outcome.is_err());
        assert!(PageHelper::local_page().is_none());
    }

    #[test]
    fn nested_pages_restore_outer() {
        PageHelper::page(1, 10, || {
            PageHelper::page(3, 2, || Ok(Vec::<i32>::new()))?;
            assert_eq!(PageHelper::local_page().map(|p| p.current()), Some(1));
            Ok(Vec::<i32>::new())
        })
        .unwrap();
        assert!(PageHelper::local_page().is_none());
    }

    #[test]
    fn total_written_in_place_is_returned() {
        let page = PageHelper::page(1, 10, || {
            PageHelper::with_local_page(|p| p.unwrap().set_total(42));
            Ok(vec!["x"])
        })
        .unwrap();
        assert_eq!(page.total(), 42);
        assert_eq!(page.pages(), 5);
    }
}
