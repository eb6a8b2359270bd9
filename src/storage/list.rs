//! List store: a doubly-linked ring of node records in the flat key space.
//!
//! The attribute record at id 0 holds `(len, head, tail, counter)`; nodes are
//! keyed by u32 ids handed out by `counter`, which only ever grows. Pointers
//! are node ids, never in-memory references; each operation loads only the
//! nodes it touches. Ring invariant: `tail.next = head` and `head.prev =
//! tail`, so boundaries are detected by comparing ids against the attribute,
//! not by chasing pointers.

use crate::storage::keys::{
    encode_field_prefix, encode_list_element_key, encode_meta_key, encode_metadata,
};
use crate::storage::{Database, Result, StorageError, ValueType};

#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct ListAttr {
    length: u32,
    head: u32,
    tail: u32,
    counter: u32,
}

/// Where LINSERT places the new element relative to the pivot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InsertPosition {
    Before,
    After,
}

fn decode_attr(record: &[u8]) -> ListAttr {
    if record.len() < 16 {
        return ListAttr::default();
    }
    ListAttr {
        length: u32::from_be_bytes(record[0..4].try_into().unwrap()),
        head: u32::from_be_bytes(record[4..8].try_into().unwrap()),
        tail: u32::from_be_bytes(record[8..12].try_into().unwrap()),
        counter: u32::from_be_bytes(record[12..16].try_into().unwrap()),
    }
}

fn encode_attr(attr: ListAttr) -> Vec<u8> {
    let mut record = Vec::with_capacity(16);
    record.extend_from_slice(&attr.length.to_be_bytes());
    record.extend_from_slice(&attr.head.to_be_bytes());
    record.extend_from_slice(&attr.tail.to_be_bytes());
    record.extend_from_slice(&attr.counter.to_be_bytes());
    record
}

impl Database {
    fn get_list_attr(&self, key: &[u8]) -> Result<ListAttr> {
        let record = self.backend().get(&encode_list_element_key(key, 0))?;
        Ok(record.as_deref().map(decode_attr).unwrap_or_default())
    }

    fn put_list_attr(&self, key: &[u8], attr: ListAttr) -> Result<()> {
        self.backend()
            .put(&encode_list_element_key(key, 0), &encode_attr(attr))
    }

    /// `(next, prev, value)`; zeros and empty bytes when the node is absent.
    fn get_list_element(&self, key: &[u8], id: u32) -> Result<(u32, u32, Vec<u8>)> {
        let record = match self.backend().get(&encode_list_element_key(key, id))? {
            Some(record) if record.len() >= 8 => record,
            _ => return Ok((0, 0, Vec::new())),
        };
        let next = u32::from_be_bytes(record[0..4].try_into().unwrap());
        let prev = u32::from_be_bytes(record[4..8].try_into().unwrap());
        Ok((next, prev, record[8..].to_vec()))
    }

    fn put_list_element(
        &self,
        key: &[u8],
        id: u32,
        next: u32,
        prev: u32,
        value: &[u8],
    ) -> Result<()> {
        let mut record = Vec::with_capacity(8 + value.len());
        record.extend_from_slice(&next.to_be_bytes());
        record.extend_from_slice(&prev.to_be_bytes());
        record.extend_from_slice(value);
        self.backend().put(&encode_list_element_key(key, id), &record)
    }

    /// Splices node `id` out, rewriting both neighbors. The double write on
    /// a two-node ring is deliberate: the second put repairs the field the
    /// first one read stale.
    fn del_list_element(&self, key: &[u8], id: u32) -> Result<()> {
        let (next, prev, _) = self.get_list_element(key, id)?;
        self.backend().delete(&[encode_list_element_key(key, id)])?;

        if next == id {
            return Ok(());
        }

        let (_, prev_prev, prev_value) = self.get_list_element(key, prev)?;
        self.put_list_element(key, prev, next, prev_prev, &prev_value)?;

        let (next_next, _, next_value) = self.get_list_element(key, next)?;
        self.put_list_element(key, next, next_next, prev, &next_value)
    }

    pub fn push_list_head(&self, key: &[u8], tipe: ValueType, value: &[u8]) -> Result<u32> {
        let mut attr = self.get_list_attr(key)?;

        attr.length += 1;
        attr.counter += 1;
        if attr.length == 1 {
            self.backend()
                .put(&encode_meta_key(key), &encode_metadata(tipe))?;
            attr.head = attr.counter;
            attr.tail = attr.counter;
        }

        self.put_list_element(key, attr.counter, attr.head, attr.tail, value)?;

        if attr.length != 1 {
            let (head_next, _, head_value) = self.get_list_element(key, attr.head)?;
            self.put_list_element(key, attr.head, head_next, attr.counter, &head_value)?;

            let (_, tail_prev, tail_value) = self.get_list_element(key, attr.tail)?;
            self.put_list_element(key, attr.tail, attr.counter, tail_prev, &tail_value)?;
        }

        attr.head = attr.counter;
        self.put_list_attr(key, attr)?;
        Ok(attr.length)
    }

    pub fn push_list_tail(&self, key: &[u8], tipe: ValueType, value: &[u8]) -> Result<u32> {
        let mut attr = self.get_list_attr(key)?;

        attr.length += 1;
        attr.counter += 1;
        if attr.length == 1 {
            self.backend()
                .put(&encode_meta_key(key), &encode_metadata(tipe))?;
            attr.head = attr.counter;
            attr.tail = attr.counter;
        }

        self.put_list_element(key, attr.counter, attr.head, attr.tail, value)?;

        if attr.length != 1 {
            let (head_next, _, head_value) = self.get_list_element(key, attr.head)?;
            self.put_list_element(key, attr.head, head_next, attr.counter, &head_value)?;

            let (_, tail_prev, tail_value) = self.get_list_element(key, attr.tail)?;
            self.put_list_element(key, attr.tail, attr.counter, tail_prev, &tail_value)?;
        }

        attr.tail = attr.counter;
        self.put_list_attr(key, attr)?;
        Ok(attr.length)
    }

    pub fn pop_list_head(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        let mut attr = self.get_list_attr(key)?;
        if attr.length == 0 {
            return Ok(None);
        }

        let (head_next, _, head_value) = self.get_list_element(key, attr.head)?;
        if attr.length == 1 {
            self.backend().delete(&[
                encode_meta_key(key),
                encode_list_element_key(key, attr.head),
                encode_list_element_key(key, 0),
            ])?;
        } else {
            let (_, tail_prev, tail_value) = self.get_list_element(key, attr.tail)?;
            self.put_list_element(key, attr.tail, head_next, tail_prev, &tail_value)?;

            if head_next != attr.tail {
                let (next_next, _, next_value) = self.get_list_element(key, head_next)?;
                self.put_list_element(key, head_next, next_next, attr.tail, &next_value)?;
            }

            self.backend()
                .delete(&[encode_list_element_key(key, attr.head)])?;
            attr.length -= 1;
            attr.head = head_next;
            self.put_list_attr(key, attr)?;
        }

        Ok(Some(head_value))
    }

    pub fn pop_list_tail(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        let mut attr = self.get_list_attr(key)?;
        if attr.length == 0 {
            return Ok(None);
        }

        let (_, tail_prev, tail_value) = self.get_list_element(key, attr.tail)?;
        if attr.length == 1 {
            self.backend().delete(&[
                encode_meta_key(key),
                encode_list_element_key(key, attr.tail),
                encode_list_element_key(key, 0),
            ])?;
        } else {
            let (head_next, _, head_value) = self.get_list_element(key, attr.head)?;
            self.put_list_element(key, attr.head, head_next, tail_prev, &head_value)?;

            if attr.head != tail_prev {
                let (_, prev_prev, prev_value) = self.get_list_element(key, tail_prev)?;
                self.put_list_element(key, tail_prev, attr.head, prev_prev, &prev_value)?;
            }

            self.backend()
                .delete(&[encode_list_element_key(key, attr.tail)])?;
            attr.length -= 1;
            attr.tail = tail_prev;
            self.put_list_attr(key, attr)?;
        }

        Ok(Some(tail_value))
    }

    /// Element `n` counting forward from the head.
    pub fn get_lindex_from_head(&self, key: &[u8], n: u32) -> Result<Option<Vec<u8>>> {
        let attr = self.get_list_attr(key)?;
        if attr.length < n + 1 {
            return Ok(None);
        }

        let mut id = attr.head;
        for _ in 0..n {
            let (next, _, _) = self.get_list_element(key, id)?;
            id = next;
        }
        let (_, _, value) = self.get_list_element(key, id)?;
        Ok(Some(value))
    }

    /// Element `n` counting backward from the tail.
    pub fn get_lindex_from_tail(&self, key: &[u8], n: u32) -> Result<Option<Vec<u8>>> {
        let attr = self.get_list_attr(key)?;
        if attr.length < n + 1 {
            return Ok(None);
        }

        let mut id = attr.tail;
        for _ in 0..n {
            let (_, prev, _) = self.get_list_element(key, id)?;
            id = prev;
        }
        let (_, _, value) = self.get_list_element(key, id)?;
        Ok(Some(value))
    }

    pub fn get_list_range(&self, key: &[u8], start: i64, end: i64) -> Result<Vec<Vec<u8>>> {
        let attr = self.get_list_attr(key)?;
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

        let mut id = attr.head;
        for _ in 0..start {
            let (next, _, _) = self.get_list_element(key, id)?;
            id = next;
        }

        let mut values = Vec::with_capacity((end - start + 1) as usize);
        for _ in start..=end {
            let (next, _, value) = self.get_list_element(key, id)?;
            values.push(value);
            id = next;
        }
        Ok(values)
    }

    pub fn set_list_element(&self, key: &[u8], index: i64, value: &[u8]) -> Result<()> {
        let attr = self.get_list_attr(key)?;
        let len = attr.length as i64;

        let index = if index < 0 { index + len } else { index };
        if index < 0 || index >= len {
            return Err(StorageError::IndexOutOfRange);
        }

        let mut id = attr.head;
        for _ in 0..index {
            let (next, _, _) = self.get_list_element(key, id)?;
            id = next;
        }
        let (next, prev, _) = self.get_list_element(key, id)?;
        self.put_list_element(key, id, next, prev, value)
    }

    /// Keeps the inclusive range `[start, end]`, deleting everything outside
    /// it. An empty range deletes the whole list.
    pub fn trim_list(&self, key: &[u8], start: i64, end: i64) -> Result<()> {
        let attr = self.get_list_attr(key)?;
        let len = attr.length as i64;

        let mut start = if start < 0 { len + start } else { start };
        let mut end = if end < 0 { len + end } else { end };

        if start < 0 {
            start = 0;
        }
        if end < 0 {
            end = 0;
        }
        if end >= len {
            end = len - 1;
        }
        if start >= len || start > end {
            return self.delete_list(key);
        }

        let mut trims = Vec::new();
        let mut id = attr.head;
        for _ in 0..start {
            trims.push(encode_list_element_key(key, id));
            let (next, _, _) = self.get_list_element(key, id)?;
            id = next;
        }

        let new_head = id;
        for _ in start..end {
            let (next, _, _) = self.get_list_element(key, id)?;
            id = next;
        }
        let new_tail = id;

        // Everything after the new tail, up to and including the old tail.
        while id != attr.tail {
            let (next, _, _) = self.get_list_element(key, id)?;
            id = next;
            trims.push(encode_list_element_key(key, id));
        }

        self.backend().delete(&trims)?;

        let (next, _, value) = self.get_list_element(key, new_head)?;
        self.put_list_element(key, new_head, next, new_tail, &value)?;
        let (_, prev, value) = self.get_list_element(key, new_tail)?;
        self.put_list_element(key, new_tail, new_head, prev, &value)?;

        self.put_list_attr(
            key,
            ListAttr {
                length: (end - start + 1) as u32,
                head: new_head,
                tail: new_tail,
                counter: attr.counter,
            },
        )
    }

    /// Removes up to `|count|` nodes equal to `value`, from the head when
    /// `count > 0`, from the tail when `count < 0`. `count = 0` removes
    /// nothing (callers short-circuit it).
    pub fn rem_list(&self, key: &[u8], count: i64, value: &[u8]) -> Result<u32> {
        if count == 0 {
            return Ok(0);
        }

        let mut removed: u32 = 0;
        let mut attr = self.get_list_attr(key)?;

        let mut id = if count < 0 { attr.tail } else { attr.head };

        for _ in 0..attr.length {
            if removed as u64 >= count.unsigned_abs() {
                break;
            }
            let (next, prev, node_value) = self.get_list_element(key, id)?;

            if node_value == value {
                removed += 1;
                if removed == attr.length {
                    self.delete_list(key)?;
                    return Ok(removed);
                }

                self.del_list_element(key, id)?;

                if id == attr.head {
                    attr.head = next;
                }
                if id == attr.tail {
                    attr.tail = prev;
                }
            }

            id = if count > 0 { next } else { prev };
        }

        attr.length -= removed;
        self.put_list_attr(key, attr)?;
        Ok(removed)
    }

    /// Splices `value` before or after the first node equal to `pivot`.
    /// Returns the new length, or -1 when the pivot is not found.
    pub fn insert_list(
        &self,
        key: &[u8],
        position: InsertPosition,
        pivot: &[u8],
        value: &[u8],
    ) -> Result<i64> {
        let mut attr = self.get_list_attr(key)?;

        let mut curr = attr.head;
        let mut next = attr.head;
        let mut prev = attr.head;
        let mut curr_value = Vec::new();
        let mut found = false;
        for _ in 0..attr.length {
            curr = next;
            let (n, p, v) = self.get_list_element(key, next)?;
            next = n;
            prev = p;
            curr_value = v;
            if curr_value == pivot {
                found = true;
                break;
            }
        }

        if !found {
            return Ok(-1);
        }

        attr.counter += 1;
        attr.length += 1;

        match position {
            InsertPosition::Before => {
                self.put_list_element(key, attr.counter, curr, prev, value)?;
                self.put_list_element(key, curr, next, attr.counter, &curr_value)?;

                let old_prev = prev;
                let (_, prev_prev, prev_value) = self.get_list_element(key, prev)?;
                self.put_list_element(key, old_prev, attr.counter, prev_prev, &prev_value)?;

                if curr == attr.head {
                    attr.head = attr.counter;
                }
            }
            InsertPosition::After => {
                self.put_list_element(key, attr.counter, next, curr, value)?;
                self.put_list_element(key, curr, attr.counter, prev, &curr_value)?;

                let old_next = next;
                let (next_next, _, next_value) = self.get_list_element(key, next)?;
                self.put_list_element(key, old_next, next_next, attr.counter, &next_value)?;

                if curr == attr.tail {
                    attr.tail = attr.counter;
                }
            }
        }

        self.put_list_attr(key, attr)?;
        Ok(attr.length as i64)
    }

    pub fn get_list_length(&self, key: &[u8]) -> Result<u32> {
        Ok(self.get_list_attr(key)?.length)
    }

    pub fn delete_list(&self, key: &[u8]) -> Result<()> {
        let mut keys = vec![encode_meta_key(key)];
        for entry in self.backend().scan_prefix(&encode_field_prefix(key)) {
            let (record_key, _) = entry?;
            keys.push(record_key);
        }
        self.backend().delete(&keys)
    }
}
