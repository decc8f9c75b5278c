use chrono::Utc;
use common::Direction;
use futures::{Stream, TryStreamExt, stream};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};

use crate::entity::stock_transaction;
use crate::models::{HistoryWindow, TransactionEntry};

/// Append-only record of quantity changes.
///
/// Borrows whatever connection it is given, so the same code runs against the
/// pool or inside a caller's transaction.
pub struct TransactionLedger<'a, C: ConnectionTrait> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> TransactionLedger<'a, C> {
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    /// Record a movement. The stored sign comes from `direction`, never from
    /// the sign of `requested_amount`.
    pub async fn append(
        &self,
        product_id: i32,
        requested_amount: i64,
        direction: Direction,
    ) -> Result<TransactionEntry, DbErr> {
        let entry = stock_transaction::ActiveModel {
            product_id: Set(product_id),
            change_amount: Set(direction.signed(requested_amount)),
            transaction_type: Set(direction.kind()),
            timestamp: Set(Utc::now()),
            ..Default::default()
        };

        let model = entry.insert(self.conn).await?;
        Ok(model.into())
    }

    /// Signed sum of every entry for a product.
    pub async fn sum_for(&self, product_id: i32) -> Result<i64, DbErr> {
        // Summed here rather than with SUM(), whose result type differs per backend.
        let amounts: Vec<i64> = stock_transaction::Entity::find()
            .select_only()
            .column(stock_transaction::Column::ChangeAmount)
            .filter(stock_transaction::Column::ProductId.eq(product_id))
            .into_tuple()
            .all(self.conn)
            .await?;

        Ok(amounts.into_iter().sum())
    }

    /// Delete every entry of a product. Only valid as part of deleting the product.
    pub async fn purge(&self, product_id: i32) -> Result<u64, DbErr> {
        let result = stock_transaction::Entity::delete_many()
            .filter(stock_transaction::Column::ProductId.eq(product_id))
            .exec(self.conn)
            .await?;
        Ok(result.rows_affected)
    }

    /// Newest-first history of a product, fixed to the entries that exist now.
    pub async fn history(
        &self,
        product_id: i32,
        window: HistoryWindow,
    ) -> Result<HistoryCursor<'a, C>, DbErr> {
        let cutoff: Option<Option<i32>> = stock_transaction::Entity::find()
            .select_only()
            .column_as(stock_transaction::Column::Id.max(), "max_id")
            .filter(stock_transaction::Column::ProductId.eq(product_id))
            .into_tuple()
            .one(self.conn)
            .await?;

        Ok(HistoryCursor {
            conn: self.conn,
            product_id,
            window,
            cutoff: cutoff.flatten(),
            yielded: 0,
            done: false,
        })
    }
}

/// Page-at-a-time reader over one product's history.
///
/// Entries appended after the cursor was opened are never yielded, and
/// [`restart`](Self::restart) replays the same sequence from the top.
pub struct HistoryCursor<'a, C: ConnectionTrait> {
    conn: &'a C,
    product_id: i32,
    window: HistoryWindow,
    /// Highest entry id visible to this cursor; `None` when the history was empty.
    cutoff: Option<i32>,
    yielded: u64,
    done: bool,
}

impl<'a, C: ConnectionTrait> HistoryCursor<'a, C> {
    /// Fetch the next page, or `None` once the window is exhausted.
    pub async fn next_page(&mut self) -> Result<Option<Vec<TransactionEntry>>, DbErr> {
        let Some(cutoff) = self.cutoff else {
            return Ok(None);
        };
        if self.done {
            return Ok(None);
        }

        let mut page_size = self.window.page_size.max(1);
        if let Some(limit) = self.window.limit {
            page_size = page_size.min(limit.saturating_sub(self.yielded));
        }
        if page_size == 0 {
            self.done = true;
            return Ok(None);
        }

        let mut query = stock_transaction::Entity::find()
            .filter(stock_transaction::Column::ProductId.eq(self.product_id))
            .filter(stock_transaction::Column::Id.lte(cutoff));
        if let Some(since) = self.window.since {
            query = query.filter(stock_transaction::Column::Timestamp.gte(since));
        }
        if let Some(until) = self.window.until {
            query = query.filter(stock_transaction::Column::Timestamp.lt(until));
        }

        let rows = query
            .order_by_desc(stock_transaction::Column::Timestamp)
            .order_by_desc(stock_transaction::Column::Id)
            .offset(self.yielded)
            .limit(page_size)
            .all(self.conn)
            .await?;

        if (rows.len() as u64) < page_size {
            self.done = true;
        }
        if rows.is_empty() {
            return Ok(None);
        }

        self.yielded += rows.len() as u64;
        Ok(Some(rows.into_iter().map(TransactionEntry::from).collect()))
    }

    /// Rewind to the newest entry of the original snapshot.
    pub fn restart(&mut self) {
        self.yielded = 0;
        self.done = false;
    }

    /// Drain the remaining pages into one vector.
    pub async fn collect_all(&mut self) -> Result<Vec<TransactionEntry>, DbErr> {
        let mut entries = Vec::new();
        while let Some(page) = self.next_page().await? {
            entries.extend(page);
        }
        Ok(entries)
    }

    /// The cursor as a stream of entries.
    pub fn into_stream(self) -> impl Stream<Item = Result<TransactionEntry, DbErr>> + 'a {
        stream::try_unfold(self, |mut cursor| async move {
            let page = cursor.next_page().await?;
            Ok::<_, DbErr>(page.map(|entries| {
                (
                    stream::iter(entries.into_iter().map(Ok::<_, DbErr>)),
                    cursor,
                )
            }))
        })
        .try_flatten()
    }
}
