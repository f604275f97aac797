mod file_dto;

pub use file_dto::{
    is_mime_type_allowed, stored_extension, FileResponseDto,
    ListFilesQuery, UploadedFile, ALLOWED_MIME_TYPES, MAX_FILE_SIZE,
};
