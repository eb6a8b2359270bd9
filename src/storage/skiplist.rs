//! Sorted-set store: a probabilistic skip list persisted node-by-node.
//!
//! Node identity is the member field bytes; forward/backward "pointers" are
//! therefore field bytes too, and each operation loads only the nodes it
//! walks. The header node lives under the reserved field `0x00000001`, the
//! attribute record under `0x00000000`. Every forward pointer carries a span
//! (level-0 steps covered) so rank lookups stay O(log n).
//!
//! Scores are little-endian IEEE-754 on disk; every other integer in the
//! record is big-endian. Both byte orders are shared with other
//! implementations of this format and must be preserved.

use rand::Rng;

use crate::storage::keys::{
    encode_field_key, encode_field_prefix, encode_meta_key, encode_metadata,
};
use crate::storage::{Database, Result, StorageError, ValueType};

pub const SKIPLIST_MAX_LEVEL: usize = 32;
pub const SKIPLIST_P: f64 = 0.25;

const SKIP_ATTR_FIELD: [u8; 4] = [0x00, 0x00, 0x00, 0x00];
const SKIP_HEAD_FIELD: [u8; 4] = [0x00, 0x00, 0x00, 0x01];

/// One member with its score, in skip-list order.
#[derive(Debug, Clone, PartialEq)]
pub struct SkipListElement {
    pub field: Vec<u8>,
    pub score: f64,
}

#[derive(Debug, Clone, Default)]
struct SkipLevel {
    forward: Vec<u8>,
    span: u32,
}

#[derive(Debug, Clone)]
struct SkipAttr {
    length: u32,
    level: u32,
    tail: Vec<u8>,
}

#[derive(Debug, Clone)]
struct SkipNode {
    field: Vec<u8>,
    score: f64,
    backward: Vec<u8>,
    levels: Vec<SkipLevel>,
}

fn init_skip_node(field: Vec<u8>) -> SkipNode {
    SkipNode {
        field,
        score: 0.0,
        backward: Vec::new(),
        levels: (0..SKIPLIST_MAX_LEVEL).map(|_| SkipLevel::default()).collect(),
    }
}

/// `(score, field)` of the candidate strictly precedes the target pair.
fn precedes(candidate: &SkipNode, score: f64, field: &[u8]) -> bool {
    candidate.score < score || (candidate.score == score && candidate.field.as_slice() < field)
}

fn random_level() -> u32 {
    let mut rng = rand::thread_rng();
    let mut level: u32 = 1;
    while (rng.gen::<u32>() & 0xFFFF) as f64 <= SKIPLIST_P * 0xFFFF as f64 {
        level += 1;
    }
    level.min(SKIPLIST_MAX_LEVEL as u32)
}

/// Nodes loaded during one operation, at most one copy per field. Mutations
/// through the cache accumulate the way the original pointer graph would,
/// then get persisted in one sweep.
struct NodeCache {
    nodes: Vec<SkipNode>,
}

impl NodeCache {
    fn new(head: SkipNode) -> NodeCache {
        NodeCache { nodes: vec![head] }
    }

    fn load(&mut self, db: &Database, key: &[u8], field: &[u8]) -> Result<usize> {
        if let Some(position) = self.nodes.iter().position(|n| n.field == field) {
            return Ok(position);
        }
        let node = db
            .get_skip_node(key, field)?
            .ok_or(StorageError::MetaFormat)?;
        self.nodes.push(node);
        Ok(self.nodes.len() - 1)
    }
}

impl Database {
    fn get_skip_attr(&self, key: &[u8]) -> Result<Option<SkipAttr>> {
        let record = match self.backend().get(&encode_field_key(key, &SKIP_ATTR_FIELD))? {
            Some(record) => record,
            None => return Ok(None),
        };
        if record.len() < 9 {
            return Ok(None);
        }
        let length = u32::from_be_bytes(record[0..4].try_into().unwrap());
        let level = u32::from_be_bytes(record[4..8].try_into().unwrap());
        let tail_len = record[8] as usize;
        if record.len() < 9 + tail_len {
            return Err(StorageError::MetaFormat);
        }
        let tail = record[9..9 + tail_len].to_vec();
        Ok(Some(SkipAttr { length, level, tail }))
    }

    fn put_skip_attr(&self, key: &[u8], attr: &SkipAttr) -> Result<()> {
        let mut record = Vec::with_capacity(9 + attr.tail.len());
        record.extend_from_slice(&attr.length.to_be_bytes());
        record.extend_from_slice(&attr.level.to_be_bytes());
        record.push(attr.tail.len() as u8);
        record.extend_from_slice(&attr.tail);
        self.backend()
            .put(&encode_field_key(key, &SKIP_ATTR_FIELD), &record)
    }

    fn get_skip_node(&self, key: &[u8], field: &[u8]) -> Result<Option<SkipNode>> {
        let record = match self.backend().get(&encode_field_key(key, field))? {
            Some(record) => record,
            None => return Ok(None),
        };
        if record.len() < 9 {
            return Err(StorageError::MetaFormat);
        }

        let score = f64::from_le_bytes(record[0..8].try_into().unwrap());
        let backward_len = record[8] as usize;
        if record.len() < 9 + backward_len {
            return Err(StorageError::MetaFormat);
        }
        let backward = record[9..9 + backward_len].to_vec();

        let mut cursor = 9 + backward_len;
        let mut levels = Vec::with_capacity(SKIPLIST_MAX_LEVEL);
        for _ in 0..SKIPLIST_MAX_LEVEL {
            if cursor >= record.len() {
                return Err(StorageError::MetaFormat);
            }
            let forward_len = record[cursor] as usize;
            cursor += 1;
            if forward_len == 0 {
                levels.push(SkipLevel::default());
                continue;
            }
            if record.len() < cursor + forward_len + 4 {
                return Err(StorageError::MetaFormat);
            }
            let forward = record[cursor..cursor + forward_len].to_vec();
            cursor += forward_len;
            let span = u32::from_be_bytes(record[cursor..cursor + 4].try_into().unwrap());
            cursor += 4;
            levels.push(SkipLevel { forward, span });
        }

        Ok(Some(SkipNode {
            field: field.to_vec(),
            score,
            backward,
            levels,
        }))
    }

    fn put_skip_node(&self, key: &[u8], node: &SkipNode) -> Result<()> {
        let mut record = Vec::with_capacity(9 + node.backward.len() + SKIPLIST_MAX_LEVEL);
        record.extend_from_slice(&node.score.to_le_bytes());
        record.push(node.backward.len() as u8);
        record.extend_from_slice(&node.backward);
        for level in &node.levels {
            record.push(level.forward.len() as u8);
            if !level.forward.is_empty() {
                record.extend_from_slice(&level.forward);
                record.extend_from_slice(&level.span.to_be_bytes());
            }
        }
        self.backend().put(&encode_field_key(key, &node.field), &record)
    }

    /// Adds `field` with `score`, or updates the score of an existing member
    /// in place. Returns whether the member is new to the set.
    pub fn add_skip_field(
        &self,
        key: &[u8],
        tipe: ValueType,
        field: &[u8],
        score: f64,
    ) -> Result<bool> {
        if self.get_skip_attr(key)?.is_some() {
            if let Some(existing) = self.get_skip_node(key, field)? {
                if existing.score == score {
                    return Ok(false);
                }
                self.delete_skip_field(key, field)?;
                self.insert_skip_field(key, tipe, field, score)?;
                return Ok(false);
            }
        }
        self.insert_skip_field(key, tipe, field, score)?;
        Ok(true)
    }

    fn insert_skip_field(
        &self,
        key: &[u8],
        tipe: ValueType,
        field: &[u8],
        score: f64,
    ) -> Result<()> {
        let mut attr = match self.get_skip_attr(key)? {
            Some(attr) => attr,
            None => {
                self.backend()
                    .put(&encode_meta_key(key), &encode_metadata(tipe))?;
                let attr = SkipAttr {
                    length: 0,
                    level: 1,
                    tail: Vec::new(),
                };
                self.put_skip_attr(key, &attr)?;
                self.put_skip_node(key, &init_skip_node(SKIP_HEAD_FIELD.to_vec()))?;
                attr
            }
        };

        let head = self
            .get_skip_node(key, &SKIP_HEAD_FIELD)?
            .ok_or(StorageError::MetaFormat)?;
        let mut cache = NodeCache::new(head);

        let mut update = [0usize; SKIPLIST_MAX_LEVEL];
        let mut rank = [0u32; SKIPLIST_MAX_LEVEL];
        let mut curr = 0usize;

        for i in (0..attr.level as usize).rev() {
            rank[i] = if i + 1 == attr.level as usize {
                0
            } else {
                rank[i + 1]
            };
            loop {
                let forward = cache.nodes[curr].levels[i].forward.clone();
                if forward.is_empty() {
                    break;
                }
                let next = cache.load(self, key, &forward)?;
                if precedes(&cache.nodes[next], score, field) {
                    rank[i] += cache.nodes[curr].levels[i].span;
                    curr = next;
                } else {
                    break;
                }
            }
            update[i] = curr;
        }

        let level = random_level();
        if level > attr.level {
            for i in attr.level as usize..level as usize {
                rank[i] = 0;
                update[i] = 0;
                cache.nodes[0].levels[i].span = attr.length;
            }
            attr.level = level;
        }

        let mut node = init_skip_node(field.to_vec());
        node.score = score;
        for i in 0..level as usize {
            node.levels[i].forward = cache.nodes[update[i]].levels[i].forward.clone();
            cache.nodes[update[i]].levels[i].forward = field.to_vec();

            // The span of a slot whose forward is empty is garbage and never
            // persisted, so wrapping arithmetic is safe here.
            node.levels[i].span =
                cache.nodes[update[i]].levels[i].span.wrapping_sub(rank[0] - rank[i]);
            cache.nodes[update[i]].levels[i].span = (rank[0] - rank[i]) + 1;
        }
        for i in level as usize..attr.level as usize {
            cache.nodes[update[i]].levels[i].span += 1;
        }

        if update[0] != 0 {
            node.backward = cache.nodes[update[0]].field.clone();
        }

        let first_forward = node.levels[0].forward.clone();
        if !first_forward.is_empty() {
            let next = cache.load(self, key, &first_forward)?;
            cache.nodes[next].backward = field.to_vec();
        } else {
            attr.tail = field.to_vec();
        }

        attr.length += 1;
        self.put_skip_attr(key, &attr)?;
        self.put_skip_node(key, &node)?;
        for touched in &cache.nodes {
            self.put_skip_node(key, touched)?;
        }
        Ok(())
    }

    /// Removes `field`; destroys the whole sorted set when it was the last
    /// member. Returns how many members were removed (0 or 1).
    pub fn delete_skip_field(&self, key: &[u8], field: &[u8]) -> Result<u32> {
        let mut attr = match self.get_skip_attr(key)? {
            Some(attr) => attr,
            None => return Ok(0),
        };
        let node = match self.get_skip_node(key, field)? {
            Some(node) => node,
            None => return Ok(0),
        };

        let head = self
            .get_skip_node(key, &SKIP_HEAD_FIELD)?
            .ok_or(StorageError::MetaFormat)?;
        let mut cache = NodeCache::new(head);

        let mut update = [0usize; SKIPLIST_MAX_LEVEL];
        let mut curr = 0usize;
        for i in (0..attr.level as usize).rev() {
            loop {
                let forward = cache.nodes[curr].levels[i].forward.clone();
                if forward.is_empty() {
                    break;
                }
                let next = cache.load(self, key, &forward)?;
                if precedes(&cache.nodes[next], node.score, field) {
                    curr = next;
                } else {
                    break;
                }
            }
            update[i] = curr;
        }

        for i in 0..attr.level as usize {
            let u = update[i];
            if cache.nodes[u].levels[i].forward == node.field {
                cache.nodes[u].levels[i].span = cache.nodes[u].levels[i]
                    .span
                    .wrapping_add(node.levels[i].span)
                    .wrapping_sub(1);
                cache.nodes[u].levels[i].forward = node.levels[i].forward.clone();
            } else {
                cache.nodes[u].levels[i].span = cache.nodes[u].levels[i].span.wrapping_sub(1);
            }
        }

        let first_forward = node.levels[0].forward.clone();
        if !first_forward.is_empty() {
            let next = cache.load(self, key, &first_forward)?;
            cache.nodes[next].backward = node.backward.clone();
        } else {
            attr.tail = node.backward.clone();
        }

        while attr.level > 1
            && cache.nodes[0].levels[(attr.level - 1) as usize]
                .forward
                .is_empty()
        {
            attr.level -= 1;
        }
        attr.length -= 1;

        if attr.length == 0 {
            self.delete_skip(key)?;
            return Ok(1);
        }

        for touched in &cache.nodes {
            if touched.field != node.field {
                self.put_skip_node(key, touched)?;
            }
        }
        self.put_skip_attr(key, &attr)?;
        self.backend().delete(&[encode_field_key(key, field)])?;
        Ok(1)
    }

    /// 0-based rank of `field` in (score, field) order.
    pub fn get_skip_field_rank(&self, key: &[u8], field: &[u8]) -> Result<Option<u32>> {
        let node = match self.get_skip_node(key, field)? {
            Some(node) => node,
            None => return Ok(None),
        };
        let attr = match self.get_skip_attr(key)? {
            Some(attr) => attr,
            None => return Ok(None),
        };

        let head = self
            .get_skip_node(key, &SKIP_HEAD_FIELD)?
            .ok_or(StorageError::MetaFormat)?;
        let mut cache = NodeCache::new(head);

        let mut rank = [0u32; SKIPLIST_MAX_LEVEL];
        let mut curr = 0usize;
        for i in (0..attr.level as usize).rev() {
            rank[i] = if i + 1 == attr.level as usize {
                0
            } else {
                rank[i + 1]
            };
            loop {
                let forward = cache.nodes[curr].levels[i].forward.clone();
                if forward.is_empty() {
                    break;
                }
                let next = cache.load(self, key, &forward)?;
                if precedes(&cache.nodes[next], node.score, field) {
                    rank[i] += cache.nodes[curr].levels[i].span;
                    curr = next;
                } else {
                    break;
                }
            }
        }

        Ok(Some(rank[0]))
    }

    pub fn get_skip_range(&self, key: &[u8], start: i64, end: i64) -> Result<Vec<SkipListElement>> {
        let attr = match self.get_skip_attr(key)? {
            Some(attr) => attr,
            None => return Ok(Vec::new()),
        };
        let len = attr.length as i64;

        let mut start = if start < 0 { len + start } else { start };
        let mut end = if end < 0 { len + end } else { end };

        if start < 0 {
            start = 0;
        }
        if start >= len {
            return Ok(Vec::new());
        }
        if end < 0 {
            end = 0;
        }
        if end >= len {
            end = len - 1;
        }
        if start > end {
            return Ok(Vec::new());
        }

        let head = self
            .get_skip_node(key, &SKIP_HEAD_FIELD)?
            .ok_or(StorageError::MetaFormat)?;
        let mut forward = head.levels[0].forward.clone();

        for _ in 0..start {
            if forward.is_empty() {
                return Ok(Vec::new());
            }
            let node = self
                .get_skip_node(key, &forward)?
                .ok_or(StorageError::MetaFormat)?;
            forward = node.levels[0].forward.clone();
        }

        let mut elements = Vec::with_capacity((end - start + 1) as usize);
        for _ in start..=end {
            if forward.is_empty() {
                break;
            }
            let node = self
                .get_skip_node(key, &forward)?
                .ok_or(StorageError::MetaFormat)?;
            forward = node.levels[0].forward.clone();
            elements.push(SkipListElement {
                field: node.field,
                score: node.score,
            });
        }
        Ok(elements)
    }

    /// Members with `min <= score <= max`, bounds optionally exclusive.
    pub fn get_skip_range_by_score(
        &self,
        key: &[u8],
        min: f64,
        min_exclusive: bool,
        max: f64,
        max_exclusive: bool,
    ) -> Result<Vec<SkipListElement>> {
        if min > max || (min == max && (min_exclusive || max_exclusive)) {
            return Ok(Vec::new());
        }
        let attr = match self.get_skip_attr(key)? {
            Some(attr) => attr,
            None => return Ok(Vec::new()),
        };

        // Descend to the last node strictly below the min bound.
        let mut node = self
            .get_skip_node(key, &SKIP_HEAD_FIELD)?
            .ok_or(StorageError::MetaFormat)?;
        for i in (0..attr.level as usize).rev() {
            loop {
                let forward = node.levels[i].forward.clone();
                if forward.is_empty() {
                    break;
                }
                let next = self
                    .get_skip_node(key, &forward)?
                    .ok_or(StorageError::MetaFormat)?;
                let below_min = if min_exclusive {
                    next.score <= min
                } else {
                    next.score < min
                };
                if below_min {
                    node = next;
                } else {
                    break;
                }
            }
        }

        let mut elements = Vec::new();
        let mut forward = node.levels[0].forward.clone();
        while !forward.is_empty() {
            let next = self
                .get_skip_node(key, &forward)?
                .ok_or(StorageError::MetaFormat)?;
            let within_max = if max_exclusive {
                next.score < max
            } else {
                next.score <= max
            };
            if !within_max {
                break;
            }
            forward = next.levels[0].forward.clone();
            elements.push(SkipListElement {
                field: next.field,
                score: next.score,
            });
        }
        Ok(elements)
    }

    pub fn get_skip_length(&self, key: &[u8]) -> Result<u32> {
        Ok(self.get_skip_attr(key)?.map(|attr| attr.length).unwrap_or(0))
    }

    pub fn delete_skip(&self, key: &[u8]) -> Result<()> {
        let mut keys = vec![encode_meta_key(key)];
        for entry in self.backend().scan_prefix(&encode_field_prefix(key)) {
            let (record_key, _) = entry?;
            keys.push(record_key);
        }
        self.backend().delete(&keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::test_database;

    fn add(db: &Database, key: &[u8], score: f64, field: &[u8]) -> bool {
        db.add_skip_field(key, ValueType::SortedSet, field, score)
            .unwrap()
    }

    fn fields(elements: &[SkipListElement]) -> Vec<Vec<u8>> {
        elements.iter().map(|e| e.field.clone()).collect()
    }

    /// The span sums across every live level must equal the list length.
    fn assert_span_invariant(db: &Database, key: &[u8]) {
        let attr = db.get_skip_attr(key).unwrap().unwrap();
        for level in 0..attr.level as usize {
            let mut steps = 0u32;
            let mut node = db
                .get_skip_node(key, &SKIP_HEAD_FIELD)
                .unwrap()
                .unwrap();
            while !node.levels[level].forward.is_empty() {
                steps += node.levels[level].span;
                node = db
                    .get_skip_node(key, &node.levels[level].forward)
                    .unwrap()
                    .unwrap();
            }
            assert_eq!(steps, attr.length, "level {} spans", level);
        }
    }

    #[test]
    fn ordering_is_score_then_field() {
        let db = test_database();
        add(&db, b"z", 1.0, b"a");
        add(&db, b"z", 3.0, b"c");
        add(&db, b"z", 2.0, b"b");
        add(&db, b"z", 2.0, b"d");

        let elements = db.get_skip_range(b"z", 0, -1).unwrap();
        assert_eq!(fields(&elements), vec![b"a", b"b", b"d", b"c"]);
        assert_eq!(elements[1].score, 2.0);
        assert_eq!(db.has(b"z").unwrap(), Some(ValueType::SortedSet));
        assert_span_invariant(&db, b"z");
    }

    #[test]
    fn rank_matches_position() {
        let db = test_database();
        add(&db, b"z", 1.0, b"a");
        add(&db, b"z", 2.0, b"b");
        add(&db, b"z", 3.0, b"c");
        add(&db, b"z", 2.0, b"d");

        assert_eq!(db.get_skip_field_rank(b"z", b"a").unwrap(), Some(0));
        assert_eq!(db.get_skip_field_rank(b"z", b"b").unwrap(), Some(1));
        assert_eq!(db.get_skip_field_rank(b"z", b"d").unwrap(), Some(2));
        assert_eq!(db.get_skip_field_rank(b"z", b"c").unwrap(), Some(3));
        assert_eq!(db.get_skip_field_rank(b"z", b"nope").unwrap(), None);
    }

    #[test]
    fn re_adding_updates_score_in_place() {
        let db = test_database();
        assert!(add(&db, b"z", 3.0, b"a"));
        assert!(!add(&db, b"z", 5.0, b"a"));
        assert!(!add(&db, b"z", 5.0, b"a"));

        assert_eq!(db.get_skip_length(b"z").unwrap(), 1);
        let elements = db.get_skip_range(b"z", 0, -1).unwrap();
        assert_eq!(elements.len(), 1);
        assert_eq!(elements[0].score, 5.0);
        assert_span_invariant(&db, b"z");
    }

    #[test]
    fn delete_splices_and_shrinks() {
        let db = test_database();
        for i in 0..64u32 {
            add(&db, b"z", i as f64, format!("m{:03}", i).as_bytes());
        }
        assert_eq!(db.get_skip_length(b"z").unwrap(), 64);
        assert_span_invariant(&db, b"z");

        assert_eq!(db.delete_skip_field(b"z", b"m031").unwrap(), 1);
        assert_eq!(db.delete_skip_field(b"z", b"m031").unwrap(), 0);
        assert_eq!(db.get_skip_length(b"z").unwrap(), 63);
        assert_span_invariant(&db, b"z");

        let elements = db.get_skip_range(b"z", 30, 32).unwrap();
        assert_eq!(fields(&elements), vec![b"m030", b"m032", b"m033"]);
    }

    #[test]
    fn deleting_last_member_destroys_the_set() {
        let db = test_database();
        add(&db, b"z", 1.0, b"only");
        assert_eq!(db.delete_skip_field(b"z", b"only").unwrap(), 1);

        assert_eq!(db.has(b"z").unwrap(), None);
        assert_eq!(db.get_skip_length(b"z").unwrap(), 0);
        assert!(db.get_skip_range(b"z", 0, -1).unwrap().is_empty());
    }

    #[test]
    fn range_normalizes_indices() {
        let db = test_database();
        add(&db, b"z", 1.0, b"a");
        add(&db, b"z", 2.0, b"b");
        add(&db, b"z", 3.0, b"c");

        assert_eq!(fields(&db.get_skip_range(b"z", 0, -1).unwrap()), vec![b"a", b"b", b"c"]);
        assert_eq!(fields(&db.get_skip_range(b"z", -2, -1).unwrap()), vec![b"b", b"c"]);
        assert!(db.get_skip_range(b"z", 5, 9).unwrap().is_empty());
    }

    #[test]
    fn range_by_score_bounds() {
        let db = test_database();
        add(&db, b"z", 1.0, b"x");
        add(&db, b"z", 2.0, b"y");
        add(&db, b"z", 3.0, b"z");

        let all = db.get_skip_range_by_score(b"z", 1.0, false, 3.0, false).unwrap();
        assert_eq!(fields(&all), vec![b"x", b"y", b"z"]);

        let open_min = db.get_skip_range_by_score(b"z", 1.0, true, 3.0, false).unwrap();
        assert_eq!(fields(&open_min), vec![b"y", b"z"]);

        let open_max = db.get_skip_range_by_score(b"z", 1.0, false, 3.0, true).unwrap();
        assert_eq!(fields(&open_max), vec![b"x", b"y"]);

        assert!(db.get_skip_range_by_score(b"z", 3.0, false, 1.0, false).unwrap().is_empty());
        assert!(db.get_skip_range_by_score(b"z", 2.0, true, 2.0, false).unwrap().is_empty());
    }

    #[test]
    fn score_bytes_are_little_endian() {
        let db = test_database();
        add(&db, b"z", 1.5, b"m");
        let record = db
            .backend()
            .get(&encode_field_key(b"z", b"m"))
            .unwrap()
            .unwrap();
        assert_eq!(&record[0..8], &1.5f64.to_le_bytes());
    }
}
