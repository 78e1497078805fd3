use std::collections::HashMap;

use litmerge_core::SourceTag;

use crate::identifiers::CanonicalIsbn;
use crate::ingest::KeyedRecord;

/// Identifier of a candidate group inside one [`CandidatePool`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GroupId(usize);

/// Secondary records already known to be one book because they share a
/// canonical identifier. Members are ordered by (source, position).
#[derive(Debug, Clone)]
pub struct CandidateGroup<'a> {
    pub id: GroupId,
    pub members: Vec<KeyedRecord<'a>>,
}

impl<'a> CandidateGroup<'a> {
    pub fn lead(&self) -> &KeyedRecord<'a> {
        &self.members[0]
    }

    pub fn sources(&self) -> impl Iterator<Item = SourceTag> + '_ {
        self.members.iter().map(|m| m.source)
    }
}

/// Canonical identifier -> candidate group, over all secondary sources.
#[derive(Debug, Clone, Default)]
pub struct IdentifierIndex {
    by_isbn: HashMap<CanonicalIsbn, GroupId>,
}

impl IdentifierIndex {
    pub fn lookup(&self, isbn: &CanonicalIsbn) -> Option<GroupId> {
        self.by_isbn.get(isbn).copied()
    }

    pub fn len(&self) -> usize {
        self.by_isbn.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_isbn.is_empty()
    }
}

/// Unclaimed candidate groups. Claiming moves a group out, so no group can
/// end up in two clusters.
#[derive(Debug)]
pub struct CandidatePool<'a> {
    slots: Vec<Option<CandidateGroup<'a>>>,
    remaining: usize,
}

impl<'a> CandidatePool<'a> {
    /// Take ownership of a group; `None` if it was already claimed.
    pub fn claim(&mut self, id: GroupId) -> Option<CandidateGroup<'a>> {
        let group = self.slots.get_mut(id.0)?.take();
        if group.is_some() {
            self.remaining -= 1;
        }
        group
    }

    pub fn is_claimed(&self, id: GroupId) -> bool {
        self.slots.get(id.0).is_none_or(Option::is_none)
    }

    /// Unclaimed groups in pool order.
    pub fn unclaimed(&self) -> impl Iterator<Item = &CandidateGroup<'a>> {
        self.slots.iter().flatten()
    }

    pub fn remaining(&self) -> usize {
        self.remaining
    }

    /// Whatever was never claimed, in pool order.
    pub fn into_remaining(self) -> Vec<CandidateGroup<'a>> {
        self.slots.into_iter().flatten().collect()
    }
}

/// Build the identifier index and the candidate pool from every secondary
/// record. Records sharing any canonical identifier, directly or through a
/// chain, land in one group. Groups are ordered by their first member.
pub fn build_index<'a>(
    mut records: Vec<KeyedRecord<'a>>,
) -> (IdentifierIndex, CandidatePool<'a>) {
    records.sort_by_key(KeyedRecord::order_key);

    let mut first_holder: HashMap<&CanonicalIsbn, usize> = HashMap::new();
    let mut dsu = DisjointSet::new(records.len());
    for (idx, record) in records.iter().enumerate() {
        for isbn in &record.isbns {
            match first_holder.get(isbn) {
                Some(&holder) => dsu.union(holder, idx),
                None => {
                    first_holder.insert(isbn, idx);
                }
            }
        }
    }

    // Group ids follow the position of each component's first member.
    let mut group_of_root: HashMap<usize, usize> = HashMap::new();
    let mut member_groups: Vec<usize> = Vec::with_capacity(records.len());
    for idx in 0..records.len() {
        let root = dsu.find(idx);
        let next = group_of_root.len();
        member_groups.push(*group_of_root.entry(root).or_insert(next));
    }

    let mut by_isbn = HashMap::new();
    for (isbn, holder) in first_holder {
        by_isbn.insert(isbn.clone(), GroupId(member_groups[holder]));
    }

    let mut slots: Vec<Option<CandidateGroup<'a>>> = (0..group_of_root.len())
        .map(|g| {
            Some(CandidateGroup {
                id: GroupId(g),
                members: Vec::new(),
            })
        })
        .collect();
    for (record, group) in records.into_iter().zip(member_groups) {
        if let Some(slot) = slots[group].as_mut() {
            slot.members.push(record);
        }
    }

    let remaining = slots.len();
    (IdentifierIndex { by_isbn }, CandidatePool { slots, remaining })
}

#[derive(Debug, Clone)]
struct DisjointSet {
    parent: Vec<usize>,
    rank: Vec<u8>,
}

impl DisjointSet {
    fn new(size: usize) -> Self {
        Self {
            parent: (0..size).collect(),
            rank: vec![0; size],
        }
    }

    fn find(&mut self, x: usize) -> usize {
        if self.parent[x] != x {
            let root = self.find(self.parent[x]);
            self.parent[x] = root;
        }
        self.parent[x]
    }

    fn union(&mut self, left: usize, right: usize) {
        let left_root = self.find(left);
        let right_root = self.find(right);

        if left_root == right_root {
            return;
        }

        let left_rank = self.rank[left_root];
        let right_rank = self.rank[right_root];

        if left_rank < right_rank {
            self.parent[left_root] = right_root;
        } else if left_rank > right_rank {
            self.parent[right_root] = left_root;
        } else {
            self.parent[right_root] = left_root;
            self.rank[left_root] += 1;
        }
    }
}
