/// Truncate `items` to the global `--limit`, when one was given.
pub fn apply_limit<T>(items: &mut Vec<T>, limit: Option<u32>) {
    if let Some(limit) = limit {
        items.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
    }
}

#[cfg(test)]
mod tests {
    use super::apply_limit;

    #[test]
    fn limit_truncates() {
        let mut items = vec![1, 2, 3, 4];
        apply_limit(&mut items, Some(2));
        assert_eq!(items, vec![1, 2]);
    }

    #[test]
    fn no_limit_keeps_everything() {
        let mut items = vec![1, 2, 3];
        apply_limit(&mut items, None);
        assert_eq!(items.len(), 3);
    }

    #[test]
    fn zero_limit_empties() {
        let mut items = vec![1];
        apply_limit(&mut items, Some(0));
        assert!(items.is_empty());
    }
}
