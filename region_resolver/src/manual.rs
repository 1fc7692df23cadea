/*!

This is the long-form manual for `region_resolver` and `bilidash`.

## Input tables

The resolver consumes two flat tables produced from the 2016 Canadian census
release on childhood home bilingualism.

### Region statistics

One row per geographic unit shown on the map. Expected columns:

| column | content |
|---|---|
| `Region` | numeric map join key; empty for the country-wide aggregate row |
| `name` | human-readable unit name |
| `province` | province the unit belongs to |
| `area` | source bucket tag; `zz_other` marks rows excluded from the name join |
| `Percent_age_0_to_4` | home bilingualism among children aged 0-4 |
| `Percent_age_5_to_9` | home bilingualism among children aged 5-9 |
| `Percent_age_0_to_9` | combined band |

### Language-pair statistics

One row per (geographic unit, language pair) combination. Expected columns:

| column | content |
|---|---|
| `type` | `cma`, `province`, `territory` or `canada` |
| `area` | area name (used as the display name for `cma` rows) |
| `province` | province name (used as the display name for `province` rows) |
| `language_pair_collapsed` | display label of the pair |
| `percent_bilingual_children_age_*` | three columns, one per age band |
| `percent_all_children_age_*` | three columns, one per age band |

## The join

Each language-pair row derives a display name from its `type` and is
left-joined to the region table on that name. Rows that match no region are
dropped; `canada` rows are kept with no region id and answer the default
(no-selection) query.

## Lookups

A map selection carries a region id, a display name and a province. The id is
the lookup key except for three documented mismatches between the boundary
layer and the census tables:

- a name containing `Ottawa` in province `Quebec` resolves to `Gatineau`;
- a name containing `Ottawa` in province `Ontario` resolves to `Ottawa`;
- `Northwest Territories`, `Nunavut` and `Yukon` all resolve to
  `Northern Canada`.

These three cases are looked up by display name instead of region id.

*/
