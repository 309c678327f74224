#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::{
        debugger::{DebugLevel, Debugger, MemorySink},
        error::IndexError,
        storage::{BPlusTree, PagedIndex, RecordIndex},
    };

    #[test]
    fn pages_fill_before_appending() {
        let mut index = PagedIndex::new(2);
        for k in 0..5 {
            index.insert(k, k * 10);
        }

        assert_eq!(index.len(), 5);
        assert_eq!(index.page_count(), 3);
    }

    #[test]
    fn removal_frees_room_in_earlier_pages() {
        let mut index = PagedIndex::new(2);
        for k in 0..4 {
            index.insert(k, ());
        }

        index.remove(&0);
        index.insert(9, ());

        assert_eq!(index.page_count(), 2);
        let order: Vec<i32> = index.iter().map(|r| r.key).collect();
        assert_eq!(order, vec![1, 9, 2, 3]);
    }

    #[test]
    fn remove_drops_every_duplicate() {
        let mut index = PagedIndex::new(3);
        index.insert(7, "a");
        index.insert(1, "b");
        index.insert(7, "c");
        index.insert(7, "d");

        assert_eq!(index.search(&7), vec![&"a", &"c", &"d"]);
        assert_eq!(index.remove(&7), 3);
        assert!(index.search(&7).is_empty());
        assert_eq!(index.len(), 1);
        assert_eq!(index.remove(&42), 0);
    }

    #[test]
    fn range_scan_sorts_and_keeps_arrival_order() {
        let mut index = PagedIndex::new(2);
        for (k, v) in [(30, "e"), (5, "c"), (10, "a"), (5, "x"), (25, "f"), (99, "z")] {
            index.insert(k, v);
        }

        assert_eq!(
            index.range_scan(&5, &30),
            vec![(&5, &"c"), (&5, &"x"), (&10, &"a"), (&25, &"f"), (&30, &"e")]
        );
        assert!(index.range_scan(&31, &98).is_empty());
    }

    #[test]
    fn zero_page_size_is_rejected() {
        assert_eq!(
            PagedIndex::<i64, ()>::try_new(0).err(),
            Some(IndexError::InvalidPageSize { page_size: 0 })
        );
    }

    #[test]
    fn page_appends_are_logged() {
        let sink = Arc::new(MemorySink::default());
        let dbg = Arc::new(Debugger::new(DebugLevel::Debug).with_sink(sink.clone()));

        let mut index = PagedIndex::new(1).with_debugger(dbg);
        index.insert(1, ());
        index.insert(2, ());

        assert_eq!(
            sink.lines(),
            vec!["DEBUG [PAGES] all 1 pages full, appending page 1".to_string()]
        );
    }

    fn backends() -> Vec<Box<dyn RecordIndex<i64, String>>> {
        vec![Box::new(BPlusTree::new(4)), Box::new(PagedIndex::new(4))]
    }

    #[test]
    fn backends_agree_on_unique_keys() {
        for mut index in backends() {
            for (k, v) in [(10, "A"), (20, "B"), (5, "C"), (6, "D"), (30, "E"), (25, "F")] {
                index.insert(k, v.to_string());
            }

            assert_eq!(index.search(&10), vec!["A".to_string()], "{}", index.name());

            index.remove(&20);

            let keys: Vec<i64> = index.range(&5, &30).into_iter().map(|(k, _)| k).collect();
            assert_eq!(keys, vec![5, 6, 10, 25, 30], "{}", index.name());
            assert_eq!(index.len(), 5);
            assert!(!index.is_empty());
        }
    }

    #[test]
    fn remove_drops_duplicates_on_every_backend() {
        for mut index in backends() {
            index.insert(1, "x".into());
            index.insert(2, "keep".into());
            index.insert(1, "y".into());
            index.insert(1, "z".into());

            index.remove(&1);

            assert!(index.search(&1).is_empty(), "{}", index.name());
            assert_eq!(index.search(&2), vec!["keep".to_string()]);
            assert_eq!(index.len(), 1, "{}", index.name());
        }
    }
}
