//! Address repository.

use sqlx::PgPool;

use hearthside_core::{AddressId, UserId};

use super::RepositoryError;
use crate::models::address::{Address, AddressInput};

const ADDRESS_COLUMNS: &str = r"
    id, user_id, address_type, first_name, last_name, street_address,
    apartment, city, state, postal_code, country, phone, is_default, created_at
";

/// Repository for saved customer addresses.
pub struct AddressRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> AddressRepository<'a> {
    /// Create a new address repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List the user's addresses, defaults first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, user_id: UserId) -> Result<Vec<Address>, RepositoryError> {
        let rows = sqlx::query_as(&format!(
            r"
            SELECT {ADDRESS_COLUMNS}
            FROM addresses
            WHERE user_id = $1
            ORDER BY is_default DESC, created_at DESC
            "
        ))
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows)
    }

    /// Create an address for the user.
    ///
    /// When `is_default` is set the previous default of the same address
    /// type is cleared in the same transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a statement fails.
    pub async fn create(
        &self,
        user_id: UserId,
        input: &AddressInput,
    ) -> Result<Address, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        if input.is_default {
            clear_default(&mut tx, user_id, input).await?;
        }

        let address: Address = sqlx::query_as(&format!(
            r"
            INSERT INTO addresses
                (user_id, address_type, first_name, last_name, street_address,
                 apartment, city, state, postal_code, country, phone, is_default)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING {ADDRESS_COLUMNS}
            "
        ))
        .bind(user_id)
        .bind(input.address_type)
        .bind(&input.first_name)
        .bind(&input.last_name)
        .bind(&input.street_address)
        .bind(&input.apartment)
        .bind(&input.city)
        .bind(&input.state)
        .bind(&input.postal_code)
        .bind(&input.country)
        .bind(&input.phone)
        .bind(input.is_default)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(address)
    }

    /// Replace an address owned by the user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the address does not exist or
    /// belongs to another user.
    pub async fn update(
        &self,
        user_id: UserId,
        address_id: AddressId,
        input: &AddressInput,
    ) -> Result<Address, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        if input.is_default {
            clear_default(&mut tx, user_id, input).await?;
        }

        let row: Option<Address> = sqlx::query_as(&format!(
            r"
            UPDATE addresses
            SET address_type = $3, first_name = $4, last_name = $5,
                street_address = $6, apartment = $7, city = $8, state = $9,
                postal_code = $10, country = $11, phone = $12, is_default = $13
            WHERE id = $1 AND user_id = $2
            RETURNING {ADDRESS_COLUMNS}
            "
        ))
        .bind(address_id)
        .bind(user_id)
        .bind(input.address_type)
        .bind(&input.first_name)
        .bind(&input.last_name)
        .bind(&input.street_address)
        .bind(&input.apartment)
        .bind(&input.city)
        .bind(&input.state)
        .bind(&input.postal_code)
        .bind(&input.country)
        .bind(&input.phone)
        .bind(input.is_default)
        .fetch_optional(&mut *tx)
        .await?;

        let address = row.ok_or(RepositoryError::NotFound)?;
        tx.commit().await?;
        Ok(address)
    }

    /// Delete an address owned by the user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the address does not exist or
    /// belongs to another user.
    pub async fn delete(
        &self,
        user_id: UserId,
        address_id: AddressId,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM addresses WHERE id = $1 AND user_id = $2")
            .bind(address_id)
            .bind(user_id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}

/// Clear the default flag on the user's other addresses of the same type.
async fn clear_default(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    user_id: UserId,
    input: &AddressInput,
) -> Result<(), RepositoryError> {
    sqlx::query(
        "UPDATE addresses SET is_default = FALSE WHERE user_id = $1 AND address_type = $2",
    )
    .bind(user_id)
    .bind(input.address_type)
    .execute(&mut **tx)
    .await?;
    Ok(())
}
