//! 课件存储操作

use sea_orm::EntityTrait;

use super::SeaOrmStorage;
use crate::entity::materials::Entity as Materials;
use crate::errors::{EduNotifyError, Result};
use crate::models::notifications::entities::Material;

impl SeaOrmStorage {
    /// 通过 ID 获取课件
    pub async fn get_material_by_id_impl(&self, material_id: i64) -> Result<Option<Material>> {
        let result = Materials::find_by_id(material_id)
            .one(&self.db)
            .await
            .map_err(|e| EduNotifyError::database_operation(format!("查询课件失败: {e}")))?;

        Ok(result.map(|m| m.into_material()))
    }
}
