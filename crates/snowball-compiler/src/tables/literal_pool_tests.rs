use super::literal_pool::{LiteralPool, LiteralRef};

fn sym(s: &str) -> Vec<u16> {
    s.encode_utf16().collect()
}

#[test]
fn identical_and_suffix_literals_share_storage() {
    let mut pool = LiteralPool::new();

    let (ing, new) = pool.intern(&sym("ing"));
    assert!(new);
    assert_eq!(ing, LiteralRef { index: 0, offset: 0 });

    let (again, new) = pool.intern(&sym("ing"));
    assert!(!new);
    assert_eq!(again, ing);

    let (ng, new) = pool.intern(&sym("ng"));
    assert!(!new);
    assert_eq!(ng, LiteralRef { index: 0, offset: 1 });

    assert_eq!(pool.len(), 1);
}

#[test]
fn sharing_only_looks_backwards() {
    let mut pool = LiteralPool::new();

    pool.intern(&sym("ed"));
    let (eed, new) = pool.intern(&sym("eed"));

    assert!(new);
    assert_eq!(eed, LiteralRef { index: 1, offset: 0 });
    assert_eq!(pool.entry(1), sym("eed").as_slice());
}

#[test]
fn prefixes_are_not_shared() {
    let mut pool = LiteralPool::new();

    pool.intern(&sym("abc"));
    let (ab, new) = pool.intern(&sym("ab"));

    assert!(new);
    assert_eq!(ab.index, 1);
}
