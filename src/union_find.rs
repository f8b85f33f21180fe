use indexmap::IndexMap;

/// Disjoint sets over hit indices, used to close overlap clusters transitively
pub struct UnionFind {
    parent: Vec<usize>,
    rank: Vec<usize>,
}

impl UnionFind {
    pub fn new(n: usize) -> Self {
        UnionFind {
            parent: (0..n).collect(),
            rank: vec![0; n],
        }
    }

    /// Root of `x`, compressing the path on the way
    pub fn find(&mut self, x: usize) -> usize {
        let mut root = x;
        while self.parent[root] != root {
            root = self.parent[root];
        }
        let mut node = x;
        while self.parent[node] != root {
            let next = self.parent[node];
            self.parent[node] = root;
            node = next;
        }
        root
    }

    pub fn union(&mut self, x: usize, y: usize) {
        let root_x = self.find(x);
        let root_y = self.find(y);
        if root_x == root_y {
            return;
        }

        match self.rank[root_x].cmp(&self.rank[root_y]) {
            std::cmp::Ordering::Less => self.parent[root_x] = root_y,
            std::cmp::Ordering::Greater => self.parent[root_y] = root_x,
            std::cmp::Ordering::Equal => {
                self.parent[root_y] = root_x;
                self.rank[root_x] += 1;
            }
        }
    }

    pub fn connected(&mut self, x: usize, y: usize) -> bool {
        self.find(x) == self.find(y)
    }

    /// All sets, ordered by their smallest member; members ascending
    pub fn sets(&mut self) -> Vec<Vec<usize>> {
        let mut by_root: IndexMap<usize, Vec<usize>> = IndexMap::new();
        for i in 0..self.parent.len() {
            let root = self.find(i);
            by_root.entry(root).or_default().push(i);
        }
        by_root.into_values().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sets_follow_first_member_order() {
        let mut uf = UnionFind::new(6);
        uf.union(4, 1);
        uf.union(5, 0);
        uf.union(2, 4);

        assert!(uf.connected(1, 2));
        assert!(!uf.connected(0, 1));
        assert_eq!(uf.sets(), vec![vec![0, 5], vec![1, 2, 4], vec![3]]);
    }
}
