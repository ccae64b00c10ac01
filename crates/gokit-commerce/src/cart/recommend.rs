//! "You may also like" selection.

use crate::cart::LineItem;
use crate::catalog::{Catalog, Product};
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashSet;

/// Pick up to `limit` catalog products that are not in the cart.
///
/// Products sharing a tag with anything in the cart come first; when there
/// are fewer than `limit` of those, the rest is filled with other products
/// in catalog order. The combined set is shuffled and then cut to `limit`.
pub fn recommend<'a, R>(
    items: &[LineItem],
    catalog: &'a Catalog,
    limit: usize,
    rng: &mut R,
) -> Vec<&'a Product>
where
    R: Rng + ?Sized,
{
    let in_cart: HashSet<_> = items.iter().map(|i| &i.product_id).collect();
    let cart_tags: HashSet<&str> = items
        .iter()
        .filter_map(|i| catalog.find(&i.product_id))
        .flat_map(|p| p.tags.iter().map(String::as_str))
        .collect();

    let mut picks: Vec<&Product> = if cart_tags.is_empty() {
        Vec::new()
    } else {
        catalog
            .iter()
            .filter(|p| !in_cart.contains(&p.id) && p.shares_tag(&cart_tags))
            .collect()
    };

    if picks.len() < limit {
        let backfill: Vec<&Product> = {
            let chosen: HashSet<_> = picks.iter().map(|p| &p.id).collect();
            catalog
                .iter()
                .filter(|p| !in_cart.contains(&p.id) && !chosen.contains(&p.id))
                .take(limit - picks.len())
                .collect()
        };
        picks.extend(backfill);
    }

    picks.shuffle(rng);
    picks.truncate(limit);
    picks
}
