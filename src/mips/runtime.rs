/// The fixed runtime library appended to every emitted program.
///
/// String helpers follow the usual MIPS calling convention: arguments in
/// `$a0..$a2`, result in `$v0`; every routine saves `$ra` itself so the
/// emitter can call them mid-function without bookkeeping.
pub const RUNTIME: &str = r#"
.data
_substr_range: .asciiz "Runtime error: substring index out of range\n"
_read_buffer_size: .word 1024

.text

# $a0: string -> $v0: length
__strlen:
	move $v0, $zero
__strlen_loop:
	add $t8, $a0, $v0
	lb $t9, 0($t8)
	beqz $t9, __strlen_done
	addiu $v0, $v0, 1
	j __strlen_loop
__strlen_done:
	jr $ra

# $a0, $a1: strings -> $v0: 1 if contents are equal
__strcmp:
__strcmp_loop:
	lb $t8, 0($a0)
	lb $t9, 0($a1)
	bne $t8, $t9, __strcmp_ne
	beqz $t8, __strcmp_eq
	addiu $a0, $a0, 1
	addiu $a1, $a1, 1
	j __strcmp_loop
__strcmp_eq:
	li $v0, 1
	jr $ra
__strcmp_ne:
	move $v0, $zero
	jr $ra

# $a0: source, $a1: destination, $a2: bytes -> $v0: destination
__memcpy:
	move $v0, $a1
__memcpy_loop:
	blez $a2, __memcpy_done
	lb $t8, 0($a0)
	sb $t8, 0($a1)
	addiu $a0, $a0, 1
	addiu $a1, $a1, 1
	addiu $a2, $a2, -1
	j __memcpy_loop
__memcpy_done:
	jr $ra

# $a0, $a1: strings -> $v0: fresh concatenation
__concat:
	addiu $sp, $sp, -16
	sw $ra, 12($sp)
	sw $a0, 8($sp)
	sw $a1, 4($sp)
	jal __strlen
	sw $v0, 0($sp)
	lw $a0, 4($sp)
	jal __strlen
	lw $t8, 0($sp)
	add $a0, $t8, $v0
	addiu $a0, $a0, 1
	li $v0, 9
	syscall
	move $t9, $v0
	lw $a0, 8($sp)
	move $a1, $t9
	lw $a2, 0($sp)
	jal __memcpy
	lw $t8, 0($sp)
	add $a1, $t9, $t8
	lw $a0, 4($sp)
	sw $t9, 8($sp)
	jal __strlen
	move $a2, $v0
	addiu $a2, $a2, 1
	lw $a0, 4($sp)
	jal __memcpy
	lw $v0, 8($sp)
	lw $ra, 12($sp)
	addiu $sp, $sp, 16
	jr $ra

# $a0: string, $a1: index, $a2: length -> $v0: fresh substring
__substr:
	addiu $sp, $sp, -16
	sw $ra, 12($sp)
	sw $a0, 8($sp)
	sw $a1, 4($sp)
	sw $a2, 0($sp)
	bltz $a1, __substr_abort
	bltz $a2, __substr_abort
	jal __strlen
	lw $t8, 4($sp)
	lw $t9, 0($sp)
	add $t8, $t8, $t9
	bgt $t8, $v0, __substr_abort
	lw $a0, 0($sp)
	addiu $a0, $a0, 1
	li $v0, 9
	syscall
	move $t9, $v0
	lw $a0, 8($sp)
	lw $t8, 4($sp)
	add $a0, $a0, $t8
	move $a1, $t9
	lw $a2, 0($sp)
	jal __memcpy
	lw $t8, 0($sp)
	add $t8, $t9, $t8
	sb $zero, 0($t8)
	move $v0, $t9
	lw $ra, 12($sp)
	addiu $sp, $sp, 16
	jr $ra
__substr_abort:
	la $a0, _substr_range
	li $v0, 4
	syscall
	li $a0, 1
	li $v0, 17
	syscall

# -> $v0: freshly read line, newline stripped
__read_str:
	addiu $sp, $sp, -4
	sw $ra, 0($sp)
	lw $a0, _read_buffer_size
	li $v0, 9
	syscall
	move $a0, $v0
	lw $a1, _read_buffer_size
	li $v0, 8
	syscall
	move $t9, $a0
	move $v0, $a0
__read_str_strip:
	lb $t8, 0($t9)
	beqz $t8, __read_str_done
	li $t7, 10
	beq $t8, $t7, __read_str_chop
	addiu $t9, $t9, 1
	j __read_str_strip
__read_str_chop:
	sb $zero, 0($t9)
__read_str_done:
	lw $ra, 0($sp)
	addiu $sp, $sp, 4
	jr $ra
"#;
