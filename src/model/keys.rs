//! Canonical keys for bonded parameter tables.
//!
//! Every key canonicalizes on construction, never post-hoc: a `BondKey` built
//! from `("o", "c3")` is identical to one built from `("c3", "o")`. The derived
//! `Ord` gives lexicographic tuple order, which is the sort/equality order used
//! everywhere downstream.

use std::fmt;

use serde::de::{self, Deserializer, SeqAccess, Visitor};
use serde::ser::{SerializeSeq, Serializer};
use serde::{Deserialize, Serialize};

/// Unordered pair of atom-type names, stored so that `t1 <= t2`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BondKey {
    pub t1: String,
    pub t2: String,
}

impl BondKey {
    pub fn new(t1: &str, t2: &str) -> Self {
        let a = t1.trim();
        let b = t2.trim();
        if a <= b {
            Self {
                t1: a.to_string(),
                t2: b.to_string(),
            }
        } else {
            Self {
                t1: b.to_string(),
                t2: a.to_string(),
            }
        }
    }

    pub fn is_canonical(&self) -> bool {
        self.t1 <= self.t2
    }

    pub fn atom_types(&self) -> [&str; 2] {
        [&self.t1, &self.t2]
    }
}

impl fmt::Display for BondKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.t1, self.t2)
    }
}

/// Ordered triple with the central atom type fixed in the middle and the
/// endpoints stored so that `t1 <= t3`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AngleKey {
    pub t1: String,
    pub t2: String,
    pub t3: String,
}

impl AngleKey {
    pub fn new(t1: &str, t2: &str, t3: &str) -> Self {
        let a = t1.trim();
        let b = t2.trim();
        let c = t3.trim();
        if a <= c {
            Self {
                t1: a.to_string(),
                t2: b.to_string(),
                t3: c.to_string(),
            }
        } else {
            Self {
                t1: c.to_string(),
                t2: b.to_string(),
                t3: a.to_string(),
            }
        }
    }

    pub fn is_canonical(&self) -> bool {
        self.t1 <= self.t3
    }

    pub fn atom_types(&self) -> [&str; 3] {
        [&self.t1, &self.t2, &self.t3]
    }
}

impl fmt::Display for AngleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.t1, self.t2, self.t3)
    }
}

/// Quadruple canonicalized by reversal: the lexicographically smaller of
/// `(t1,t2,t3,t4)` and `(t4,t3,t2,t1)` is stored.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DihedralKey {
    pub t1: String,
    pub t2: String,
    pub t3: String,
    pub t4: String,
}

impl DihedralKey {
    pub fn new(t1: &str, t2: &str, t3: &str, t4: &str) -> Self {
        let fwd = [t1.trim(), t2.trim(), t3.trim(), t4.trim()];
        let rev = [fwd[3], fwd[2], fwd[1], fwd[0]];
        let [a, b, c, d] = if fwd <= rev { fwd } else { rev };
        Self {
            t1: a.to_string(),
            t2: b.to_string(),
            t3: c.to_string(),
            t4: d.to_string(),
        }
    }

    pub fn is_canonical(&self) -> bool {
        let fwd = [&self.t1, &self.t2, &self.t3, &self.t4];
        let rev = [&self.t4, &self.t3, &self.t2, &self.t1];
        fwd <= rev
    }

    pub fn atom_types(&self) -> [&str; 4] {
        [&self.t1, &self.t2, &self.t3, &self.t4]
    }
}

impl fmt::Display for DihedralKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {}, {})", self.t1, self.t2, self.t3, self.t4)
    }
}

// Keys serialize as plain JSON arrays (["c3","o"]) and re-canonicalize on
// deserialize, so tuples coming from Requirements JSON are canonical no
// matter how the file orders them.

macro_rules! impl_key_serde {
    ($key:ident, $len:expr, [$($field:ident),+]) => {
        impl Serialize for $key {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                let mut seq = serializer.serialize_seq(Some($len))?;
                $(seq.serialize_element(&self.$field)?;)+
                seq.end()
            }
        }

        impl<'de> Deserialize<'de> for $key {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                struct KeyVisitor;

                impl<'de> Visitor<'de> for KeyVisitor {
                    type Value = $key;

                    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                        write!(f, "an array of {} atom-type strings", $len)
                    }

                    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
                        let mut parts: [Option<String>; $len] = Default::default();
                        for (i, slot) in parts.iter_mut().enumerate() {
                            *slot = Some(
                                seq.next_element::<String>()?
                                    .ok_or_else(|| de::Error::invalid_length(i, &self))?,
                            );
                        }
                        if seq.next_element::<String>()?.is_some() {
                            return Err(de::Error::invalid_length($len + 1, &self));
                        }
                        let parts: Vec<String> =
                            parts.into_iter().map(|p| p.unwrap()).collect();
                        let mut it = parts.iter().map(|s| s.as_str());
                        Ok($key::new($(replace_expr!($field, it.next().unwrap())),+))
                    }
                }

                deserializer.deserialize_seq(KeyVisitor)
            }
        }
    };
}

macro_rules! replace_expr {
    ($_t:ident, $sub:expr) => {
        $sub
    };
}

impl_key_serde!(BondKey, 2, [t1, t2]);
impl_key_serde!(AngleKey, 3, [t1, t2, t3]);
impl_key_serde!(DihedralKey, 4, [t1, t2, t3, t4]);
