//! Property search: a typed list of filter predicates that renders to a
//! parameterized Postgres statement, or evaluates directly against rows held
//! in memory.

use core_types::{PropertyListing, PropertySearch};
use rust_decimal::Decimal;

const SEARCH_BASE: &str = "SELECT properties.*, avg(property_reviews.rating) AS average_rating \
FROM properties \
LEFT JOIN property_reviews ON properties.id = property_reviews.property_id";

/// A positional bind value for a rendered search statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqlParam {
    Text(String),
    BigInt(i64),
    Numeric(Decimal),
}

/// One search filter together with the value it binds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// Case-insensitive substring match on the city. The input is not
    /// escaped, so `%` and `_` act as wildcards in both stores.
    CityContains(String),
    /// Substring match on the owner id rendered as text.
    OwnerIdContains(String),
    /// Inclusive nightly cost range, in minor units.
    CostBetween { min_cents: i64, max_cents: i64 },
    /// Mean review rating strictly above the threshold. Unreviewed
    /// properties have no mean and never match.
    AverageRatingAbove(Decimal),
}

impl Predicate {
    /// Aggregate predicates filter groups and belong in `HAVING`.
    pub fn is_aggregate(&self) -> bool {
        matches!(self, Predicate::AverageRatingAbove(_))
    }

    /// Renders the SQL condition, pushing its bind values onto `params` so
    /// placeholder numbers follow push order.
    fn render(&self, params: &mut Vec<SqlParam>) -> String {
        match self {
            Predicate::CityContains(city) => {
                let p = push(params, SqlParam::Text(format!("%{city}%")));
                format!("properties.city ILIKE {p}")
            }
            Predicate::OwnerIdContains(owner) => {
                let p = push(params, SqlParam::Text(format!("%{owner}%")));
                format!("properties.owner_id::text LIKE {p}")
            }
            Predicate::CostBetween {
                min_cents,
                max_cents,
            } => {
                let lo = push(params, SqlParam::BigInt(*min_cents));
                let hi = push(params, SqlParam::BigInt(*max_cents));
                format!("properties.cost_per_night BETWEEN {lo} AND {hi}")
            }
            Predicate::AverageRatingAbove(threshold) => {
                let p = push(params, SqlParam::Numeric(*threshold));
                format!("avg(property_reviews.rating) > {p}")
            }
        }
    }

    /// Evaluates the predicate against an already-aggregated row.
    pub fn matches(&self, listing: &PropertyListing) -> bool {
        let property = &listing.property;
        match self {
            Predicate::CityContains(city) => like(
                &format!("%{}%", city.to_lowercase()),
                &property.city.to_lowercase(),
            ),
            Predicate::OwnerIdContains(owner) => {
                like(&format!("%{owner}%"), &property.owner_id.to_string())
            }
            Predicate::CostBetween {
                min_cents,
                max_cents,
            } => (*min_cents..=*max_cents).contains(&i64::from(property.cost_per_night)),
            Predicate::AverageRatingAbove(threshold) => listing
                .average_rating
                .is_some_and(|average| average > *threshold),
        }
    }
}

/// Postgres `LIKE` matching: `%` is any run of characters, `_` exactly one,
/// and a backslash makes the next character literal.
fn like(pattern: &str, text: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let text: Vec<char> = text.chars().collect();
    like_from(&pattern, &text)
}

fn like_from(pattern: &[char], text: &[char]) -> bool {
    match pattern.split_first() {
        None => text.is_empty(),
        Some(('%', rest)) => (0..=text.len()).any(|skip| like_from(rest, &text[skip..])),
        Some(('_', rest)) => !text.is_empty() && like_from(rest, &text[1..]),
        Some(('\\', rest)) if !rest.is_empty() => {
            text.first() == Some(&rest[0]) && like_from(&rest[1..], &text[1..])
        }
        Some((c, rest)) => text.first() == Some(c) && like_from(rest, &text[1..]),
    }
}

fn push(params: &mut Vec<SqlParam>, param: SqlParam) -> String {
    params.push(param);
    format!("${}", params.len())
}

/// A property search: the filters to apply plus the row cap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    predicates: Vec<Predicate>,
    limit: u32,
}

impl SearchQuery {
    pub fn new(limit: u32) -> Self {
        Self {
            predicates: Vec::new(),
            limit,
        }
    }

    pub fn with(mut self, predicate: Predicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    /// Builds the query for the supplied search options.
    ///
    /// Filters are added in a fixed order: city, owner, price range, rating.
    /// Price bounds arrive in major units and are scaled to cents.
    pub fn from_options(options: &PropertySearch, limit: u32) -> Self {
        let mut query = Self::new(limit);
        if let Some(city) = options.city_filter() {
            query = query.with(Predicate::CityContains(city.to_string()));
        }
        if let Some(owner_id) = options.owner_id {
            query = query.with(Predicate::OwnerIdContains(owner_id.to_string()));
        }
        if let Some((min, max)) = options.price_range() {
            query = query.with(Predicate::CostBetween {
                min_cents: min.saturating_mul(100),
                max_cents: max.saturating_mul(100),
            });
        }
        if let Some(rating) = options.minimum_rating {
            query = query.with(Predicate::AverageRatingAbove(rating));
        }
        query
    }

    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Renders the full statement and its bind values.
    pub fn to_sql(&self) -> (String, Vec<SqlParam>) {
        let mut params = Vec::new();
        let mut sql = String::from(SEARCH_BASE);

        let row_filters: Vec<String> = self
            .predicates
            .iter()
            .filter(|p| !p.is_aggregate())
            .map(|p| p.render(&mut params))
            .collect();
        if !row_filters.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&row_filters.join(" AND "));
        }

        sql.push_str(" GROUP BY properties.id");

        let group_filters: Vec<String> = self
            .predicates
            .iter()
            .filter(|p| p.is_aggregate())
            .map(|p| p.render(&mut params))
            .collect();
        if !group_filters.is_empty() {
            sql.push_str(" HAVING ");
            sql.push_str(&group_filters.join(" AND "));
        }

        let limit = push(&mut params, SqlParam::BigInt(i64::from(self.limit)));
        sql.push_str(" ORDER BY properties.cost_per_night, properties.id LIMIT ");
        sql.push_str(&limit);

        (sql, params)
    }

    /// Applies the query to rows held in memory with the same semantics as
    /// the rendered SQL: filter, order by nightly cost, then cap.
    pub fn apply<I>(&self, listings: I) -> Vec<PropertyListing>
    where
        I: IntoIterator<Item = PropertyListing>,
    {
        let mut matched: Vec<PropertyListing> = listings
            .into_iter()
            .filter(|listing| self.predicates.iter().all(|p| p.matches(listing)))
            .collect();
        matched.sort_by_key(|l| (l.property.cost_per_night, l.property.id));
        matched.truncate(self.limit as usize);
        matched
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::NewProperty;
    use rust_decimal_macros::dec;

    fn listing(id: i32, owner_id: i32, city: &str, cost: i32, rating: Option<Decimal>) -> PropertyListing {
        let property = NewProperty {
            owner_id,
            title: format!("Listing {id}"),
            description: String::new(),
            thumbnail_photo_url: String::new(),
            cover_photo_url: String::new(),
            cost_per_night: cost,
            parking_spaces: 0,
            number_of_bathrooms: 1,
            number_of_bedrooms: 1,
            country: "Canada".to_string(),
            street: "1 Main St".to_string(),
            city: city.to_string(),
            province: "BC".to_string(),
            post_code: "V5K".to_string(),
            active: true,
        }
        .into_property(id);
        PropertyListing {
            property,
            average_rating: rating,
        }
    }

    #[test]
    fn no_filters_renders_no_where_clause() {
        let (sql, params) = SearchQuery::from_options(&PropertySearch::default(), 5).to_sql();
        assert!(!sql.contains("WHERE"));
        assert!(!sql.contains("HAVING"));
        assert!(sql.ends_with("ORDER BY properties.cost_per_night, properties.id LIMIT $1"));
        assert_eq!(params, vec![SqlParam::BigInt(5)]);
    }

    #[test]
    fn city_only_uses_a_single_where() {
        let options = PropertySearch {
            city: Some("Vancouver".to_string()),
            ..Default::default()
        };
        let (sql, params) = SearchQuery::from_options(&options, 10).to_sql();
        assert!(sql.contains(" WHERE properties.city ILIKE $1 GROUP BY"));
        assert_eq!(sql.matches("WHERE").count(), 1);
        assert_eq!(
            params,
            vec![SqlParam::Text("%Vancouver%".to_string()), SqlParam::BigInt(10)]
        );
    }

    #[test]
    fn all_filters_number_placeholders_in_order() {
        let options = PropertySearch {
            city: Some("Van".to_string()),
            owner_id: Some(42),
            minimum_price_per_night: Some(50),
            maximum_price_per_night: Some(150),
            minimum_rating: Some(dec!(3.5)),
        };
        let (sql, params) = SearchQuery::from_options(&options, 7).to_sql();
        assert!(sql.contains(
            " WHERE properties.city ILIKE $1 \
             AND properties.owner_id::text LIKE $2 \
             AND properties.cost_per_night BETWEEN $3 AND $4 \
             GROUP BY properties.id \
             HAVING avg(property_reviews.rating) > $5 \
             ORDER BY"
        ));
        assert!(sql.ends_with("LIMIT $6"));
        assert_eq!(
            params,
            vec![
                SqlParam::Text("%Van%".to_string()),
                SqlParam::Text("%42%".to_string()),
                SqlParam::BigInt(5_000),
                SqlParam::BigInt(15_000),
                SqlParam::Numeric(dec!(3.5)),
                SqlParam::BigInt(7),
            ]
        );
    }

    #[test]
    fn rating_alone_goes_to_having_without_where() {
        let options = PropertySearch {
            minimum_rating: Some(dec!(4)),
            ..Default::default()
        };
        let (sql, params) = SearchQuery::from_options(&options, 10).to_sql();
        assert!(!sql.contains("WHERE"));
        assert!(sql.contains("HAVING avg(property_reviews.rating) > $1"));
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn half_a_price_range_is_ignored() {
        let options = PropertySearch {
            maximum_price_per_night: Some(150),
            ..Default::default()
        };
        let query = SearchQuery::from_options(&options, 10);
        assert!(query.predicates().is_empty());
    }

    #[test]
    fn apply_filters_orders_and_caps() {
        let rows = vec![
            listing(1, 1, "North Vancouver", 30_000, Some(dec!(4.5))),
            listing(2, 2, "Toronto", 8_000, Some(dec!(5))),
            listing(3, 12, "vancouver", 12_000, None),
            listing(4, 3, "VANCOUVER", 9_000, Some(dec!(2))),
        ];
        let options = PropertySearch {
            city: Some("Vancouver".to_string()),
            ..Default::default()
        };
        let ids: Vec<i32> = SearchQuery::from_options(&options, 2)
            .apply(rows)
            .iter()
            .map(|l| l.property.id)
            .collect();
        assert_eq!(ids, vec![4, 3]);
    }

    #[test]
    fn rating_filter_is_strict_and_skips_unreviewed() {
        let predicate = Predicate::AverageRatingAbove(dec!(4));
        assert!(predicate.matches(&listing(1, 1, "A", 100, Some(dec!(4.01)))));
        assert!(!predicate.matches(&listing(2, 1, "A", 100, Some(dec!(4)))));
        assert!(!predicate.matches(&listing(3, 1, "A", 100, None)));
    }

    #[test]
    fn owner_filter_matches_as_substring() {
        let predicate = Predicate::OwnerIdContains("2".to_string());
        assert!(predicate.matches(&listing(1, 2, "A", 100, None)));
        assert!(predicate.matches(&listing(2, 12, "A", 100, None)));
        assert!(!predicate.matches(&listing(3, 13, "A", 100, None)));
    }

    #[test]
    fn price_bounds_are_inclusive() {
        let predicate = Predicate::CostBetween {
            min_cents: 5_000,
            max_cents: 15_000,
        };
        assert!(predicate.matches(&listing(1, 1, "A", 5_000, None)));
        assert!(predicate.matches(&listing(2, 1, "A", 15_000, None)));
        assert!(!predicate.matches(&listing(3, 1, "A", 15_001, None)));
    }

    #[test]
    fn city_wildcards_behave_like_ilike() {
        let underscore = Predicate::CityContains("t_r".to_string());
        assert!(underscore.matches(&listing(1, 1, "Toronto", 100, None)));
        assert!(!underscore.matches(&listing(2, 1, "Calgary", 100, None)));

        let percent = Predicate::CityContains("n%r".to_string());
        assert!(percent.matches(&listing(3, 1, "North Vancouver", 100, None)));
        assert!(!percent.matches(&listing(4, 1, "Regina", 100, None)));

        let escaped = Predicate::CityContains("\\_".to_string());
        assert!(escaped.matches(&listing(5, 1, "Lake_Louise", 100, None)));
        assert!(!escaped.matches(&listing(6, 1, "Lake Louise", 100, None)));
    }
}
