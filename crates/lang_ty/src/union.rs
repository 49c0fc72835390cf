use crate::{Ty, TyRef};

impl TyRef {
    /// Build a union: nested unions are flattened, duplicates dropped with the
    /// first occurrence kept. One member collapses to that member; no members
    /// at all is the error sentinel.
    pub fn union(members: impl IntoIterator<Item = TyRef>) -> TyRef {
        let mut flat: Vec<TyRef> = Vec::new();
        for member in members {
            match &*member.0 {
                Ty::Union(inner) => {
                    for m in inner {
                        push_unique(&mut flat, m.clone());
                    }
                }
                _ => push_unique(&mut flat, member),
            }
        }

        match flat.len() {
            0 => TyRef::error(),
            1 => flat.pop().unwrap_or_else(TyRef::error),
            _ => Ty::Union(flat).into(),
        }
    }

    /// The union members, or `self` alone.
    pub fn union_members(&self) -> Vec<TyRef> {
        match &*self.0 {
            Ty::Union(members) => members.clone(),
            _ => vec![self.clone()],
        }
    }
}

fn push_unique(into: &mut Vec<TyRef>, ty: TyRef) {
    if !into.contains(&ty) {
        into.push(ty);
    }
}
